use serde::{Deserialize, Serialize};

use crate::id::InstructorId;

/// An instructor listing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instructor {
    #[serde(rename = "_id")]
    pub id: InstructorId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Number of students taught; orders the popular listing.
    #[serde(default)]
    pub students: u64,
}

/// Order instructors by popularity (most students first) and keep `limit`.
///
/// Ties keep their input order.
pub fn most_popular(mut instructors: Vec<Instructor>, limit: usize) -> Vec<Instructor> {
    instructors.sort_by(|a, b| b.students.cmp(&a.students));
    instructors.truncate(limit);
    instructors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instructor(name: &str, students: u64) -> Instructor {
        Instructor {
            id: InstructorId::new(),
            name: name.to_string(),
            email: format!("{name}@example.com"),
            image: None,
            students,
        }
    }

    #[test]
    fn most_popular_sorts_descending_and_truncates() {
        let all = vec![instructor("a", 3), instructor("b", 10), instructor("c", 7)];
        let top = most_popular(all, 2);
        let names: Vec<_> = top.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn most_popular_is_stable_on_ties() {
        let all = vec![instructor("a", 5), instructor("b", 5)];
        let top = most_popular(all, 6);
        assert_eq!(top[0].name, "a");
        assert_eq!(top[1].name, "b");
    }
}
