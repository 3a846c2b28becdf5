//! Application context: the store, the payment gateway and the token pair,
//! constructed once at startup and shared by every handler.

use std::sync::Arc;

use anyhow::Context;

use silversport_auth::{Hs256JwtIssuer, Hs256JwtValidator, JwtIssuer, JwtValidator};
use silversport_core::Payment;
use silversport_infra::payments::{FakePaymentGateway, PaymentGateway, StripePaymentGateway};
use silversport_infra::store::{
    ClassStore, EnrollmentStore, InMemorySilverStore, PaymentStore, PostgresSilverStore,
    SilverStore,
};

use crate::app::dto::PaymentReceipt;
use crate::app::errors::ApiError;
use crate::config::AppConfig;

/// Currency of every payment intent.
pub const CURRENCY: &str = "usd";

#[derive(Clone)]
pub struct AppServices {
    pub store: Arc<dyn SilverStore>,
    pub payments: Arc<dyn PaymentGateway>,
    pub issuer: Arc<dyn JwtIssuer>,
    pub validator: Arc<dyn JwtValidator>,
}

impl AppServices {
    pub fn new(
        store: Arc<dyn SilverStore>,
        payments: Arc<dyn PaymentGateway>,
        jwt_secret: &str,
    ) -> Self {
        Self {
            store,
            payments,
            issuer: Arc::new(Hs256JwtIssuer::new(jwt_secret)),
            validator: Arc::new(Hs256JwtValidator::new(jwt_secret)),
        }
    }

    /// In-memory store and fake payments (dev/test).
    pub fn in_memory(jwt_secret: &str) -> Self {
        Self::new(
            Arc::new(InMemorySilverStore::new()),
            Arc::new(FakePaymentGateway::new()),
            jwt_secret,
        )
    }
}

/// Pick backends from configuration.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store: Arc<dyn SilverStore> = match &config.database_url {
        Some(url) => {
            let store = PostgresSilverStore::connect(url)
                .await
                .context("failed to connect to Postgres")?;
            tracing::info!("using Postgres document store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store");
            Arc::new(InMemorySilverStore::new())
        }
    };

    let payments: Arc<dyn PaymentGateway> = match &config.payment_secret_key {
        Some(key) => Arc::new(
            StripePaymentGateway::new(key.clone(), config.payment_api_base.clone())
                .context("failed to build payment client")?,
        ),
        None => Arc::new(FakePaymentGateway::new()),
    };

    Ok(AppServices::new(store, payments, &config.access_token_secret))
}

/// Record a completed payment.
///
/// Three independent writes, in order: insert the payment, take a seat from
/// the class, delete the pending enrollment. Nothing is rolled back: a failed
/// or unmatched later step leaves the earlier writes in place.
pub async fn record_payment<P, C, E>(
    payments: &P,
    classes: &C,
    enrollments: &E,
    payment: Payment,
) -> Result<PaymentReceipt, ApiError>
where
    P: PaymentStore + ?Sized,
    C: ClassStore + ?Sized,
    E: EnrollmentStore + ?Sized,
{
    let payment_id = payment.id;
    let class_id = payment.class_id;
    let enrollment_id = payment.enrollment_id;

    let insert_result = payments.insert_payment(payment).await?;

    let update_result = classes.decrement_class_seats(class_id).await.inspect_err(|e| {
        tracing::error!(%payment_id, %class_id, error = %e, "payment recorded but seat decrement failed");
    })?;
    if update_result.matched_count == 0 {
        tracing::warn!(%payment_id, %class_id, "payment recorded for unknown class; no seat taken");
    }

    let delete_result = enrollments.delete_enrollment(enrollment_id).await.inspect_err(|e| {
        tracing::error!(%payment_id, %enrollment_id, error = %e, "payment recorded but pending enrollment not removed");
    })?;

    tracing::info!(%payment_id, %class_id, %enrollment_id, "payment recorded");

    Ok(PaymentReceipt {
        insert_result,
        update_result,
        delete_result,
    })
}
