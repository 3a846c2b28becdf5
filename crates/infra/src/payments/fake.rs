use std::sync::Mutex;

use async_trait::async_trait;

use super::{PaymentError, PaymentGateway, PaymentIntent};

/// In-process payment gateway for dev/tests.
///
/// Hands out deterministic secrets and remembers every requested amount.
#[derive(Debug, Default)]
pub struct FakePaymentGateway {
    requests: Mutex<Vec<(i64, String)>>,
}

impl FakePaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requested `(amount, currency)` pairs, oldest first.
    pub fn requests(&self) -> Vec<(i64, String)> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PaymentGateway for FakePaymentGateway {
    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        let n = {
            let mut requests = self
                .requests
                .lock()
                .map_err(|_| PaymentError::UnexpectedBody("fake gateway lock poisoned".into()))?;
            requests.push((amount, currency.to_string()));
            requests.len()
        };
        Ok(PaymentIntent {
            id: format!("pi_fake_{n}"),
            client_secret: format!("pi_fake_{n}_secret_{amount}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_requests_and_returns_distinct_secrets() {
        let gateway = FakePaymentGateway::new();
        let a = gateway.create_payment_intent(1200, "usd").await.unwrap();
        let b = gateway.create_payment_intent(500, "usd").await.unwrap();

        assert_ne!(a.client_secret, b.client_secret);
        assert_eq!(
            gateway.requests(),
            vec![(1200, "usd".to_string()), (500, "usd".to_string())]
        );
    }
}
