//! Platform users and their roles.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::id::UserId;

/// Role a user holds on the platform.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Instructor,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Instructor => "instructor",
            Role::Student => "student",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "instructor" => Ok(Role::Instructor),
            "student" => Ok(Role::Student),
            other => Err(DomainError::validation(format!(
                "unknown role '{other}' (expected admin, instructor or student)"
            ))),
        }
    }
}

/// A user document, created on first sign-in.
///
/// `email` is the lookup key; uniqueness is enforced by the create route, not
/// by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            name: None,
            email: email.into(),
            photo: None,
            role: None,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("instructor".parse::<Role>().unwrap(), Role::Instructor);
        assert!("teacher".parse::<Role>().is_err());
    }

    #[test]
    fn user_without_role_holds_no_role() {
        let user = User::new("a@example.com");
        assert!(!user.has_role(Role::Admin));
        assert!(!user.has_role(Role::Student));
    }

    #[test]
    fn user_serializes_with_document_id() {
        let mut user = User::new("a@example.com");
        user.role = Some(Role::Instructor);
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["_id"], user.id.to_string());
        assert_eq!(json["role"], "instructor");
        assert!(json.get("photo").is_none());
    }
}
