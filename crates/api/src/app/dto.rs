//! Request bodies and query strings, validated at the boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use silversport_core::{
    Class, ClassFilter, ClassId, ClassStatus, DomainResult, Enrollment, EnrollmentId, Payment,
    PaymentId, User,
};
use silversport_infra::store::{DeleteOutcome, InsertOutcome, UpdateOutcome};

// -------------------------
// Query strings
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

impl EmailQuery {
    /// The queried email, or `None` when missing or blank.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().map(str::trim).filter(|e| !e.is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ClassListQuery {
    pub approve: Option<bool>,
    pub limit: Option<usize>,
}

impl From<ClassListQuery> for ClassFilter {
    fn from(q: ClassListQuery) -> Self {
        ClassFilter {
            approved_only: q.approve.unwrap_or(false),
            // `limit=0` means no limit.
            limit: q.limit.filter(|&n| n > 0),
        }
    }
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: Option<String>,
    pub photo: Option<String>,
}

impl CreateUserRequest {
    pub fn into_user(self) -> User {
        let mut user = User::new(self.email.trim());
        user.name = self.name;
        user.photo = self.photo;
        user
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateClassRequest {
    pub name: String,
    pub image: Option<String>,
    pub instructor_name: String,
    pub instructor_email: String,
    pub price: f64,
    pub available_seats: i64,
    pub status: Option<String>,
}

impl CreateClassRequest {
    pub fn into_class(self) -> DomainResult<Class> {
        let status = match self.status.as_deref() {
            Some(s) => s.parse()?,
            None => ClassStatus::Pending,
        };
        Ok(Class {
            id: ClassId::new(),
            name: self.name,
            image: self.image,
            instructor_name: self.instructor_name,
            instructor_email: self.instructor_email,
            price: self.price,
            available_seats: self.available_seats,
            status,
            feedback: None,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateClassStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub feedback: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateEnrollmentRequest {
    pub email: String,
    pub class_id: String,
    #[serde(default)]
    pub name: String,
    pub image: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub instructor_name: String,
}

impl CreateEnrollmentRequest {
    pub fn into_enrollment(self) -> DomainResult<Enrollment> {
        Ok(Enrollment {
            id: EnrollmentId::new(),
            email: self.email,
            class_id: self.class_id.parse()?,
            name: self.name,
            image: self.image,
            price: self.price,
            instructor_name: self.instructor_name,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PaymentIntentRequest {
    pub price: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub email: String,
    pub class_id: String,
    pub enrollment_id: String,
    pub price: f64,
    #[serde(default)]
    pub transaction_id: String,
    pub class_name: Option<String>,
    /// Defaults to the time the request is handled.
    pub date: Option<DateTime<Utc>>,
}

impl RecordPaymentRequest {
    pub fn into_payment(self, now: DateTime<Utc>) -> DomainResult<Payment> {
        Ok(Payment {
            id: PaymentId::new(),
            email: self.email,
            class_id: self.class_id.parse()?,
            enrollment_id: self.enrollment_id.parse()?,
            price: self.price,
            transaction_id: self.transaction_id,
            class_name: self.class_name,
            date: self.date.unwrap_or(now),
        })
    }
}

// -------------------------
// Response DTOs
// -------------------------

/// Raw outcomes of the three independent payment writes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub insert_result: InsertOutcome,
    pub update_result: UpdateOutcome,
    pub delete_result: DeleteOutcome,
}
