//! Infrastructure layer: document store and payment provider adapters.

pub mod payments;
pub mod store;
