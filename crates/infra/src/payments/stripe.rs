//! Stripe payment intents over HTTPS.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use super::{PaymentError, PaymentGateway, PaymentIntent};

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Stripe-backed gateway (`POST /v1/payment_intents`).
#[derive(Debug, Clone)]
pub struct StripePaymentGateway {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl StripePaymentGateway {
    pub fn new(secret_key: impl Into<String>, api_base: impl Into<String>) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        })
    }
}

#[async_trait]
impl PaymentGateway for StripePaymentGateway {
    #[instrument(skip(self), err)]
    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        let amount = amount.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("payment_method_types[]", "card"),
        ];

        let res = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(PaymentError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str::<PaymentIntent>(&body)
            .map_err(|e| PaymentError::UnexpectedBody(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Minimal HTTP/1.1 endpoint: answers one request with `status` and
    /// `body`, and hands back the raw request it received.
    async fn respond_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf);
                if let Some(split) = text.find("\r\n\r\n") {
                    let content_length = text[..split]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if buf.len() >= split + 4 + content_length || n == 0 {
                        break;
                    }
                } else if n == 0 {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&buf).into_owned()
        });

        (base, handle)
    }

    #[tokio::test]
    async fn posts_card_intent_form_with_bearer_key() {
        let (base, request) = respond_once(
            "200 OK",
            r#"{"id":"pi_123","client_secret":"pi_123_secret_abc","amount":1250}"#,
        )
        .await;
        let gateway = StripePaymentGateway::new("sk_test_123", base).unwrap();

        let intent = gateway.create_payment_intent(1250, "usd").await.unwrap();
        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.client_secret, "pi_123_secret_abc");

        let raw = request.await.unwrap();
        let (head, body) = raw.split_once("\r\n\r\n").unwrap();
        assert!(head.starts_with("POST /v1/payment_intents HTTP/1.1"), "{head}");
        let head = head.to_ascii_lowercase();
        assert!(head.contains("authorization: bearer sk_test_123"), "{head}");
        assert!(head.contains("content-type: application/x-www-form-urlencoded"), "{head}");
        assert_eq!(body, "amount=1250&currency=usd&payment_method_types%5B%5D=card");
    }

    #[tokio::test]
    async fn provider_error_message_is_surfaced() {
        let (base, request) = respond_once(
            "402 Payment Required",
            r#"{"error":{"type":"card_error","message":"Your card was declined."}}"#,
        )
        .await;
        let gateway = StripePaymentGateway::new("sk_test_123", base).unwrap();

        let err = gateway.create_payment_intent(500, "usd").await.unwrap_err();
        match err {
            PaymentError::Rejected { status, message } => {
                assert_eq!(status, 402);
                assert_eq!(message, "Your card was declined.");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
        request.await.unwrap();
    }

    #[tokio::test]
    async fn non_json_error_body_is_kept_verbatim() {
        let (base, request) = respond_once("503 Service Unavailable", "upstream down").await;
        let gateway = StripePaymentGateway::new("sk_test_123", base).unwrap();

        let err = gateway.create_payment_intent(500, "usd").await.unwrap_err();
        assert!(
            matches!(&err, PaymentError::Rejected { status: 503, message } if message == "upstream down"),
            "{err:?}"
        );
        request.await.unwrap();
    }

    #[tokio::test]
    async fn success_without_client_secret_is_unexpected() {
        let (base, request) = respond_once("200 OK", r#"{"id":"pi_123"}"#).await;
        let gateway = StripePaymentGateway::new("sk_test_123", base).unwrap();

        let err = gateway.create_payment_intent(500, "usd").await.unwrap_err();
        assert!(matches!(err, PaymentError::UnexpectedBody(_)), "{err:?}");
        request.await.unwrap();
    }
}
