//! Pending enrollments: a student's class selection before payment.

use serde::{Deserialize, Serialize};

use crate::id::{ClassId, EnrollmentId};

/// A pending enrollment document.
///
/// The class summary fields are copied from the client payload at selection
/// time so the student's cart renders without a second lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    #[serde(rename = "_id")]
    pub id: EnrollmentId,
    pub email: String,
    pub class_id: ClassId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub instructor_name: String,
}
