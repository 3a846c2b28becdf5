//! Payment provider boundary.
//!
//! The API only ever creates payment intents; confirmation happens client-side
//! with the returned secret.

pub mod fake;
pub mod stripe;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use fake::FakePaymentGateway;
pub use stripe::StripePaymentGateway;

/// A created payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("payment provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("payment provider returned an unexpected body: {0}")]
    UnexpectedBody(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an intent for `amount` minor units of `currency`, card only.
    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError>;
}
