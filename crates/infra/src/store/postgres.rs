//! Postgres-backed document store.
//!
//! Every collection lives in one `documents` table as JSONB bodies keyed by
//! `(collection, id)`. `seq` records insertion order, which is the natural
//! order of unsorted listings.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | Database (any code) | `Database` with the server message |
//! | PoolClosed | `Database` ("connection pool closed") |
//! | ColumnDecode / Decode | `Decode` |
//! | Other | `Database` |
//!
//! ## Atomicity
//!
//! Each method is a single statement (or a single CTE). There is no
//! transaction spanning calls.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use silversport_core::{
    Class, ClassFilter, ClassId, ClassStatus, Enrollment, EnrollmentId, Instructor, Payment, Role,
    User, UserId,
};

use super::r#trait::{
    ClassStore, DeleteOutcome, EnrollmentStore, InsertOutcome, InstructorStore, PaymentOrder,
    PaymentStore, StoreError, UpdateOutcome, UserStore,
};

const USERS: &str = "users";
const CLASSES: &str = "class";
const INSTRUCTORS: &str = "instructors";
const STUDENTS: &str = "students";
const PAYMENTS: &str = "payments";

/// Postgres-backed document store.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and shared across
/// requests.
#[derive(Debug, Clone)]
pub struct PostgresSilverStore {
    pool: Arc<PgPool>,
}

impl PostgresSilverStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and make sure the `documents` table exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id UUID NOT NULL,
                seq BIGSERIAL NOT NULL,
                body JSONB NOT NULL,
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_documents", e))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS documents_email_idx
                ON documents (collection, (body->>'email'))
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_email_index", e))?;

        Ok(())
    }

    async fn insert_doc<T: Serialize + Sync>(
        &self,
        collection: &str,
        id: Uuid,
        doc: &T,
    ) -> Result<InsertOutcome, StoreError> {
        let body = serde_json::to_value(doc).map_err(|e| StoreError::Decode(e.to_string()))?;
        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id)
            .bind(Json(body))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert", e))?;
        Ok(InsertOutcome::inserted(id))
    }

    async fn find_by_id<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: Uuid,
    ) -> Result<Option<T>, StoreError> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;
        row.as_ref().map(decode_body).transpose()
    }

    async fn find_by_field<T: DeserializeOwned>(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<T>, StoreError> {
        let rows = sqlx::query(
            "SELECT body FROM documents WHERE collection = $1 AND body->>$2 = $3 ORDER BY seq",
        )
        .bind(collection)
        .bind(field)
        .bind(value)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_field", e))?;
        rows.iter().map(decode_body).collect()
    }

    async fn list_all<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>, StoreError> {
        let rows = sqlx::query("SELECT body FROM documents WHERE collection = $1 ORDER BY seq")
            .bind(collection)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_all", e))?;
        rows.iter().map(decode_body).collect()
    }

    /// `$set` of one top-level field, reporting matched/modified like the
    /// document store does.
    async fn set_field(
        &self,
        collection: &str,
        id: Uuid,
        field: &str,
        value: JsonValue,
    ) -> Result<UpdateOutcome, StoreError> {
        let row = sqlx::query(
            r#"
            WITH target AS (
                SELECT id, (body->$3) IS DISTINCT FROM $4 AS changed
                FROM documents
                WHERE collection = $1 AND id = $2
                FOR UPDATE
            ),
            updated AS (
                UPDATE documents d
                SET body = jsonb_set(d.body, ARRAY[$3], $4, true)
                FROM target t
                WHERE d.collection = $1 AND d.id = t.id AND t.changed
                RETURNING d.id
            )
            SELECT
                (SELECT count(*) FROM target) AS matched,
                (SELECT count(*) FROM updated) AS modified
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(field)
        .bind(Json(value))
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("set_field", e))?;

        let matched: i64 = row.try_get("matched").map_err(|e| map_sqlx_error("set_field", e))?;
        let modified: i64 = row.try_get("modified").map_err(|e| map_sqlx_error("set_field", e))?;
        if matched == 0 {
            return Ok(UpdateOutcome::unmatched());
        }
        Ok(UpdateOutcome::matched(modified > 0))
    }
}

fn decode_body<T: DeserializeOwned>(row: &PgRow) -> Result<T, StoreError> {
    let Json(body): Json<JsonValue> = row
        .try_get("body")
        .map_err(|e| StoreError::Decode(e.to_string()))?;
    serde_json::from_value(body).map_err(|e| StoreError::Decode(e.to_string()))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::Database {
            operation: operation.to_string(),
            message: match db_err.code() {
                Some(code) => format!("{} (code {})", db_err.message(), code),
                None => db_err.message().to_string(),
            },
        },
        sqlx::Error::PoolClosed => StoreError::Database {
            operation: operation.to_string(),
            message: "connection pool closed".to_string(),
        },
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Decode(format!("{operation}: {err}"))
        }
        other => StoreError::Database {
            operation: operation.to_string(),
            message: other.to_string(),
        },
    }
}

fn to_json<T: Serialize>(value: T) -> Result<JsonValue, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Decode(e.to_string()))
}

#[async_trait]
impl UserStore for PostgresSilverStore {
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.list_all(USERS).await
    }

    #[instrument(skip(self), err)]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users: Vec<User> = self.find_by_field(USERS, "email", email).await?;
        Ok(users.into_iter().next())
    }

    async fn insert_user(&self, user: User) -> Result<InsertOutcome, StoreError> {
        self.insert_doc(USERS, *user.id.as_uuid(), &user).await
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn set_user_role(&self, id: UserId, role: Role) -> Result<UpdateOutcome, StoreError> {
        self.set_field(USERS, *id.as_uuid(), "role", to_json(role)?).await
    }
}

#[async_trait]
impl ClassStore for PostgresSilverStore {
    #[instrument(skip(self), err)]
    async fn list_classes(&self, filter: ClassFilter) -> Result<Vec<Class>, StoreError> {
        let limit = filter.limit.map(|n| i64::try_from(n).unwrap_or(i64::MAX));
        let rows = sqlx::query(
            r#"
            SELECT body FROM documents
            WHERE collection = $1 AND (NOT $2 OR body->>'status' = 'approve')
            ORDER BY seq
            LIMIT $3
            "#,
        )
        .bind(CLASSES)
        .bind(filter.approved_only)
        .bind(limit)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_classes", e))?;
        rows.iter().map(decode_body).collect()
    }

    async fn classes_by_instructor(&self, email: &str) -> Result<Vec<Class>, StoreError> {
        self.find_by_field(CLASSES, "instructor_email", email).await
    }

    async fn find_class(&self, id: ClassId) -> Result<Option<Class>, StoreError> {
        self.find_by_id(CLASSES, *id.as_uuid()).await
    }

    async fn insert_class(&self, class: Class) -> Result<InsertOutcome, StoreError> {
        self.insert_doc(CLASSES, *class.id.as_uuid(), &class).await
    }

    #[instrument(skip(self), fields(class_id = %id), err)]
    async fn set_class_status(
        &self,
        id: ClassId,
        status: ClassStatus,
    ) -> Result<UpdateOutcome, StoreError> {
        self.set_field(CLASSES, *id.as_uuid(), "status", to_json(status)?).await
    }

    #[instrument(skip(self, feedback), fields(class_id = %id), err)]
    async fn upsert_class_feedback(
        &self,
        id: ClassId,
        feedback: String,
    ) -> Result<UpdateOutcome, StoreError> {
        let outcome = self
            .set_field(CLASSES, *id.as_uuid(), "feedback", JsonValue::String(feedback.clone()))
            .await?;
        if outcome.matched_count > 0 {
            return Ok(outcome);
        }

        let doc = to_json(Class::feedback_only(id, feedback))?;
        let inserted = sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO NOTHING
            "#,
        )
        .bind(CLASSES)
        .bind(*id.as_uuid())
        .bind(Json(doc))
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_class_feedback", e))?;

        if inserted.rows_affected() == 0 {
            // Lost a race with a concurrent upsert; the document exists now.
            return Ok(UpdateOutcome::matched(true));
        }
        Ok(UpdateOutcome::upserted(id))
    }

    #[instrument(skip(self), fields(class_id = %id), err)]
    async fn decrement_class_seats(&self, id: ClassId) -> Result<UpdateOutcome, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET body = jsonb_set(
                body,
                '{available_seats}',
                to_jsonb(COALESCE((body->>'available_seats')::bigint, 0) - 1),
                true
            )
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(CLASSES)
        .bind(*id.as_uuid())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("decrement_class_seats", e))?;

        match result.rows_affected() {
            0 => Ok(UpdateOutcome::unmatched()),
            _ => Ok(UpdateOutcome::matched(true)),
        }
    }
}

#[async_trait]
impl InstructorStore for PostgresSilverStore {
    async fn list_instructors(&self) -> Result<Vec<Instructor>, StoreError> {
        self.list_all(INSTRUCTORS).await
    }

    #[instrument(skip(self), err)]
    async fn popular_instructors(&self, limit: usize) -> Result<Vec<Instructor>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT body FROM documents
            WHERE collection = $1
            ORDER BY COALESCE((body->>'students')::bigint, 0) DESC, seq
            LIMIT $2
            "#,
        )
        .bind(INSTRUCTORS)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("popular_instructors", e))?;
        rows.iter().map(decode_body).collect()
    }

    async fn insert_instructor(&self, instructor: Instructor) -> Result<InsertOutcome, StoreError> {
        self.insert_doc(INSTRUCTORS, *instructor.id.as_uuid(), &instructor).await
    }
}

#[async_trait]
impl EnrollmentStore for PostgresSilverStore {
    async fn enrollments_by_email(&self, email: &str) -> Result<Vec<Enrollment>, StoreError> {
        self.find_by_field(STUDENTS, "email", email).await
    }

    async fn find_enrollment(&self, id: EnrollmentId) -> Result<Option<Enrollment>, StoreError> {
        self.find_by_id(STUDENTS, *id.as_uuid()).await
    }

    async fn insert_enrollment(&self, enrollment: Enrollment) -> Result<InsertOutcome, StoreError> {
        self.insert_doc(STUDENTS, *enrollment.id.as_uuid(), &enrollment).await
    }

    #[instrument(skip(self), fields(enrollment_id = %id), err)]
    async fn delete_enrollment(&self, id: EnrollmentId) -> Result<DeleteOutcome, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(STUDENTS)
            .bind(*id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_enrollment", e))?;
        Ok(DeleteOutcome::deleted(result.rows_affected()))
    }
}

#[async_trait]
impl PaymentStore for PostgresSilverStore {
    async fn insert_payment(&self, payment: Payment) -> Result<InsertOutcome, StoreError> {
        self.insert_doc(PAYMENTS, *payment.id.as_uuid(), &payment).await
    }

    #[instrument(skip(self), err)]
    async fn payments_by_email(
        &self,
        email: &str,
        order: PaymentOrder,
    ) -> Result<Vec<Payment>, StoreError> {
        match order {
            PaymentOrder::Inserted => self.find_by_field(PAYMENTS, "email", email).await,
            PaymentOrder::NewestFirst => {
                let rows = sqlx::query(
                    r#"
                    SELECT body FROM documents
                    WHERE collection = $1 AND body->>'email' = $2
                    ORDER BY (body->>'date')::timestamptz DESC, seq
                    "#,
                )
                .bind(PAYMENTS)
                .bind(email)
                .fetch_all(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("payments_by_email", e))?;
                rows.iter().map(decode_body).collect()
            }
        }
    }
}

/// Runs against the database named by `DATABASE_URL`; each test is a no-op
/// when it is unset. Keys are unique per run so tests can share a database.
#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{Duration, Utc};
    use silversport_core::PaymentId;

    use super::*;

    // Concurrent `CREATE TABLE IF NOT EXISTS` can still collide on the catalog.
    static SCHEMA_LOCK: Mutex<()> = Mutex::new(());

    async fn test_store() -> Option<PostgresSilverStore> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping Postgres store test");
            return None;
        };
        let _guard = SCHEMA_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        Some(PostgresSilverStore::connect(&url).await.expect("connect to DATABASE_URL"))
    }

    fn unique_email(tag: &str) -> String {
        format!("{tag}-{}@example.com", Uuid::now_v7())
    }

    fn class(instructor_email: &str, status: ClassStatus, seats: i64) -> Class {
        Class {
            name: "Tennis".to_string(),
            instructor_email: instructor_email.to_string(),
            status,
            available_seats: seats,
            ..Class::feedback_only(ClassId::new(), "")
        }
    }

    #[tokio::test]
    async fn role_update_reports_match_and_modification() {
        let Some(store) = test_store().await else { return };
        let email = unique_email("role");
        let user = User::new(email.as_str());
        let id = user.id;
        store.insert_user(user).await.unwrap();

        let first = store.set_user_role(id, Role::Admin).await.unwrap();
        assert_eq!((first.matched_count, first.modified_count), (1, 1));

        let again = store.set_user_role(id, Role::Admin).await.unwrap();
        assert_eq!((again.matched_count, again.modified_count), (1, 0));

        let missing = store.set_user_role(UserId::new(), Role::Admin).await.unwrap();
        assert_eq!((missing.matched_count, missing.modified_count), (0, 0));

        let found = store.find_user_by_email(&email).await.unwrap().unwrap();
        assert_eq!(found.role, Some(Role::Admin));
    }

    #[tokio::test]
    async fn class_listing_filters_status_and_limits() {
        let Some(store) = test_store().await else { return };
        let instructor = unique_email("coach");
        let statuses = [
            ClassStatus::Approve,
            ClassStatus::Pending,
            ClassStatus::Approve,
            ClassStatus::Approve,
        ];
        for status in statuses {
            store.insert_class(class(&instructor, status, 5)).await.unwrap();
        }

        let listed = store
            .list_classes(ClassFilter { approved_only: true, limit: Some(2) })
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(Class::is_approved));

        let mine = store.classes_by_instructor(&instructor).await.unwrap();
        let order: Vec<_> = mine.iter().map(|c| c.status).collect();
        assert_eq!(order, statuses);

        let all = store.list_classes(ClassFilter::default()).await.unwrap();
        assert_eq!(all.iter().filter(|c| c.instructor_email == instructor).count(), 4);
    }

    #[tokio::test]
    async fn feedback_upserts_then_updates() {
        let Some(store) = test_store().await else { return };
        let id = ClassId::new();

        let created = store.upsert_class_feedback(id, "first".into()).await.unwrap();
        assert_eq!(created.matched_count, 0);
        assert_eq!(created.upserted_count, 1);
        assert_eq!(created.upserted_id, Some(*id.as_uuid()));

        let updated = store.upsert_class_feedback(id, "second".into()).await.unwrap();
        assert_eq!((updated.matched_count, updated.modified_count), (1, 1));
        assert_eq!(updated.upserted_count, 0);

        let same = store.upsert_class_feedback(id, "second".into()).await.unwrap();
        assert_eq!((same.matched_count, same.modified_count), (1, 0));

        let class = store.find_class(id).await.unwrap().unwrap();
        assert_eq!(class.feedback.as_deref(), Some("second"));
        assert_eq!(class.status, ClassStatus::Pending);
    }

    #[tokio::test]
    async fn seat_decrement_has_no_floor() {
        let Some(store) = test_store().await else { return };
        let full = class(&unique_email("coach"), ClassStatus::Approve, 0);
        let id = full.id;
        store.insert_class(full).await.unwrap();

        let outcome = store.decrement_class_seats(id).await.unwrap();
        assert_eq!((outcome.matched_count, outcome.modified_count), (1, 1));
        assert_eq!(store.find_class(id).await.unwrap().unwrap().available_seats, -1);

        let missing = store.decrement_class_seats(ClassId::new()).await.unwrap();
        assert_eq!(missing.matched_count, 0);
    }

    #[tokio::test]
    async fn payment_history_sorts_newest_first() {
        let Some(store) = test_store().await else { return };
        let email = unique_email("student");
        for (tx, days_ago) in [("t3", 3), ("t1", 1), ("t2", 2)] {
            store
                .insert_payment(Payment {
                    id: PaymentId::new(),
                    email: email.clone(),
                    class_id: ClassId::new(),
                    enrollment_id: EnrollmentId::new(),
                    price: 10.0,
                    transaction_id: tx.to_string(),
                    class_name: None,
                    date: Utc::now() - Duration::days(days_ago),
                })
                .await
                .unwrap();
        }

        let txs = |payments: Vec<Payment>| -> Vec<String> {
            payments.into_iter().map(|p| p.transaction_id).collect()
        };

        let newest = store.payments_by_email(&email, PaymentOrder::NewestFirst).await.unwrap();
        assert_eq!(txs(newest), ["t1", "t2", "t3"]);

        let inserted = store.payments_by_email(&email, PaymentOrder::Inserted).await.unwrap();
        assert_eq!(txs(inserted), ["t3", "t1", "t2"]);
    }

    #[tokio::test]
    async fn deleting_an_enrollment_reports_count() {
        let Some(store) = test_store().await else { return };
        let email = unique_email("student");
        let enrollment = Enrollment {
            id: EnrollmentId::new(),
            email: email.clone(),
            class_id: ClassId::new(),
            name: "Tennis".into(),
            image: None,
            price: 10.0,
            instructor_name: "Ian".into(),
        };
        let id = enrollment.id;
        store.insert_enrollment(enrollment).await.unwrap();
        assert_eq!(store.enrollments_by_email(&email).await.unwrap().len(), 1);

        assert_eq!(store.delete_enrollment(id).await.unwrap().deleted_count, 1);
        assert_eq!(store.delete_enrollment(id).await.unwrap().deleted_count, 0);
        assert!(store.find_enrollment(id).await.unwrap().is_none());
    }
}
