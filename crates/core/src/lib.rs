//! `silversport-core`: domain records shared by the store and the API.
//!
//! This crate contains **pure domain** types (no infrastructure concerns).

pub mod class;
pub mod enrollment;
pub mod error;
pub mod id;
pub mod instructor;
pub mod payment;
pub mod user;

pub use class::{Class, ClassFilter, ClassStatus};
pub use enrollment::Enrollment;
pub use error::{DomainError, DomainResult};
pub use id::{ClassId, EnrollmentId, InstructorId, PaymentId, UserId};
pub use instructor::{Instructor, most_popular};
pub use payment::{Payment, amount_in_cents};
pub use user::{Role, User};
