use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use silversport_core::{
    Class, ClassFilter, ClassId, ClassStatus, Enrollment, EnrollmentId, Instructor, Payment, Role,
    User, UserId,
};

/// Acknowledgement of an insert-one, in the document store's wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub acknowledged: bool,
    pub inserted_id: Uuid,
}

impl InsertOutcome {
    pub fn inserted(id: impl Into<Uuid>) -> Self {
        Self {
            acknowledged: true,
            inserted_id: id.into(),
        }
    }
}

/// Acknowledgement of an update-one (optionally upserting).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<Uuid>,
}

impl UpdateOutcome {
    /// Nothing matched the filter.
    pub fn unmatched() -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 0,
            upserted_id: None,
        }
    }

    /// One document matched; `modified` says whether its content changed.
    pub fn matched(modified: bool) -> Self {
        Self {
            matched_count: 1,
            modified_count: u64::from(modified),
            ..Self::unmatched()
        }
    }

    pub fn upserted(id: impl Into<Uuid>) -> Self {
        Self {
            upserted_count: 1,
            upserted_id: Some(id.into()),
            ..Self::unmatched()
        }
    }
}

/// Acknowledgement of a delete-one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteOutcome {
    pub fn deleted(count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count: count,
        }
    }
}

/// Ordering of a payment listing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PaymentOrder {
    /// Natural (insertion) order.
    #[default]
    Inserted,
    /// Most recent `date` first.
    NewestFirst,
}

/// Data store operation error.
///
/// These are **infrastructure errors**; nothing here is retried.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error in {operation}: {message}")]
    Database { operation: String, message: String },

    #[error("stored document could not be decoded: {0}")]
    Decode(String),

    #[error("store lock poisoned")]
    Poisoned,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn insert_user(&self, user: User) -> Result<InsertOutcome, StoreError>;

    async fn set_user_role(&self, id: UserId, role: Role) -> Result<UpdateOutcome, StoreError>;
}

#[async_trait]
pub trait ClassStore: Send + Sync {
    async fn list_classes(&self, filter: ClassFilter) -> Result<Vec<Class>, StoreError>;

    async fn classes_by_instructor(&self, email: &str) -> Result<Vec<Class>, StoreError>;

    async fn find_class(&self, id: ClassId) -> Result<Option<Class>, StoreError>;

    async fn insert_class(&self, class: Class) -> Result<InsertOutcome, StoreError>;

    async fn set_class_status(
        &self,
        id: ClassId,
        status: ClassStatus,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Set feedback, creating a feedback-only class document when `id` is unknown.
    async fn upsert_class_feedback(
        &self,
        id: ClassId,
        feedback: String,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Take one seat. There is no floor check.
    async fn decrement_class_seats(&self, id: ClassId) -> Result<UpdateOutcome, StoreError>;
}

#[async_trait]
pub trait InstructorStore: Send + Sync {
    async fn list_instructors(&self) -> Result<Vec<Instructor>, StoreError>;

    async fn popular_instructors(&self, limit: usize) -> Result<Vec<Instructor>, StoreError>;

    async fn insert_instructor(&self, instructor: Instructor) -> Result<InsertOutcome, StoreError>;
}

#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    async fn enrollments_by_email(&self, email: &str) -> Result<Vec<Enrollment>, StoreError>;

    async fn find_enrollment(&self, id: EnrollmentId) -> Result<Option<Enrollment>, StoreError>;

    async fn insert_enrollment(&self, enrollment: Enrollment) -> Result<InsertOutcome, StoreError>;

    async fn delete_enrollment(&self, id: EnrollmentId) -> Result<DeleteOutcome, StoreError>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert_payment(&self, payment: Payment) -> Result<InsertOutcome, StoreError>;

    async fn payments_by_email(
        &self,
        email: &str,
        order: PaymentOrder,
    ) -> Result<Vec<Payment>, StoreError>;
}

/// The whole document store: one handle serving every collection.
///
/// Operations are independent single-document calls. Nothing here groups
/// writes into a transaction.
pub trait SilverStore:
    UserStore + ClassStore + InstructorStore + EnrollmentStore + PaymentStore
{
}

impl<S> SilverStore for S where
    S: UserStore + ClassStore + InstructorStore + EnrollmentStore + PaymentStore
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_serialize_in_document_store_shape() {
        let id = Uuid::now_v7();
        let json = serde_json::to_value(UpdateOutcome::upserted(id)).unwrap();
        assert_eq!(json["matchedCount"], 0);
        assert_eq!(json["upsertedCount"], 1);
        assert_eq!(json["upsertedId"], id.to_string());

        let json = serde_json::to_value(DeleteOutcome::deleted(1)).unwrap();
        assert_eq!(json["deletedCount"], 1);
        assert_eq!(json["acknowledged"], true);

        let json = serde_json::to_value(InsertOutcome::inserted(id)).unwrap();
        assert_eq!(json["insertedId"], id.to_string());
    }

    #[test]
    fn matched_outcome_counts_modification() {
        assert_eq!(UpdateOutcome::matched(false).modified_count, 0);
        assert_eq!(UpdateOutcome::matched(true).modified_count, 1);
        assert_eq!(UpdateOutcome::matched(true).upserted_id, None);
    }
}
