//! Document store boundary.
//!
//! Handlers talk to storage only through these traits. Two backends exist:
//! an in-memory store for tests/dev and a Postgres JSONB store.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemorySilverStore;
pub use postgres::PostgresSilverStore;
pub use r#trait::{
    ClassStore, DeleteOutcome, EnrollmentStore, InsertOutcome, InstructorStore, PaymentOrder,
    PaymentStore, SilverStore, StoreError, UpdateOutcome, UserStore,
};
