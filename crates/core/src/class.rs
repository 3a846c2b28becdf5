//! Classes offered by instructors.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::id::ClassId;

/// Review status of a class.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassStatus {
    #[default]
    Pending,
    Approve,
    Deny,
}

impl ClassStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassStatus::Pending => "pending",
            ClassStatus::Approve => "approve",
            ClassStatus::Deny => "deny",
        }
    }
}

impl FromStr for ClassStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ClassStatus::Pending),
            "approve" | "approved" => Ok(ClassStatus::Approve),
            "deny" | "denied" => Ok(ClassStatus::Deny),
            other => Err(DomainError::validation(format!(
                "unknown class status '{other}'"
            ))),
        }
    }
}

/// A class document.
///
/// Every field but the id defaults, because a feedback upsert can create a
/// document that holds nothing except the id and the feedback text.
///
/// `available_seats` is signed: payments decrement it without a floor check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    #[serde(rename = "_id")]
    pub id: ClassId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub instructor_name: String,
    #[serde(default)]
    pub instructor_email: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub available_seats: i64,
    #[serde(default)]
    pub status: ClassStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl Class {
    /// Document created by a feedback upsert against an unknown id.
    pub fn feedback_only(id: ClassId, feedback: impl Into<String>) -> Self {
        Self {
            id,
            name: String::new(),
            image: None,
            instructor_name: String::new(),
            instructor_email: String::new(),
            price: 0.0,
            available_seats: 0,
            status: ClassStatus::default(),
            feedback: Some(feedback.into()),
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status == ClassStatus::Approve
    }

    /// Take one seat. No floor: the count goes negative when overbooked.
    pub fn take_seat(&mut self) {
        self.available_seats -= 1;
    }
}

/// Query-string filter for class listings.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ClassFilter {
    pub approved_only: bool,
    pub limit: Option<usize>,
}

impl ClassFilter {
    pub fn matches(&self, class: &Class) -> bool {
        !self.approved_only || class.is_approved()
    }

    /// Apply status filter then limit, preserving input order.
    pub fn apply<'a, I>(&self, classes: I) -> Vec<Class>
    where
        I: IntoIterator<Item = &'a Class>,
    {
        let matching = classes.into_iter().filter(|c| self.matches(c)).cloned();
        match self.limit {
            Some(n) => matching.take(n).collect(),
            None => matching.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn class_with_status(status: ClassStatus) -> Class {
        Class {
            status,
            ..Class::feedback_only(ClassId::new(), "")
        }
    }

    #[test]
    fn take_seat_has_no_floor() {
        let mut class = class_with_status(ClassStatus::Approve);
        class.available_seats = 0;
        class.take_seat();
        assert_eq!(class.available_seats, -1);
    }

    #[test]
    fn status_accepts_past_tense_aliases() {
        assert_eq!("approved".parse::<ClassStatus>().unwrap(), ClassStatus::Approve);
        assert_eq!("DENY".parse::<ClassStatus>().unwrap(), ClassStatus::Deny);
        assert!("archived".parse::<ClassStatus>().is_err());
    }

    #[test]
    fn feedback_only_document_deserializes_with_defaults() {
        let id = ClassId::new();
        let json = serde_json::json!({ "_id": id.to_string(), "feedback": "great" });
        let class: Class = serde_json::from_value(json).unwrap();
        assert_eq!(class.id, id);
        assert_eq!(class.status, ClassStatus::Pending);
        assert_eq!(class.feedback.as_deref(), Some("great"));
    }

    #[test]
    fn default_filter_keeps_everything() {
        let classes = vec![
            class_with_status(ClassStatus::Pending),
            class_with_status(ClassStatus::Approve),
        ];
        assert_eq!(ClassFilter::default().apply(&classes).len(), 2);
    }

    fn status_strategy() -> impl Strategy<Value = ClassStatus> {
        prop_oneof![
            Just(ClassStatus::Pending),
            Just(ClassStatus::Approve),
            Just(ClassStatus::Deny),
        ]
    }

    proptest! {
        /// Property: a filtered listing never exceeds the limit and, when
        /// restricted to approved classes, contains nothing else.
        #[test]
        fn filter_respects_limit_and_status(
            statuses in prop::collection::vec(status_strategy(), 0..20),
            approved_only in any::<bool>(),
            limit in prop::option::of(0usize..10),
        ) {
            let classes: Vec<Class> = statuses.into_iter().map(class_with_status).collect();
            let filter = ClassFilter { approved_only, limit };
            let out = filter.apply(&classes);

            if let Some(n) = limit {
                prop_assert!(out.len() <= n);
            }
            if approved_only {
                prop_assert!(out.iter().all(Class::is_approved));
            }
            let expected = classes.iter().filter(|c| filter.matches(c)).count();
            prop_assert_eq!(out.len(), limit.map_or(expected, |n| expected.min(n)));
        }
    }
}
