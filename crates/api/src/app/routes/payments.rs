use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
};
use chrono::Utc;

use silversport_core::{Payment, amount_in_cents};
use silversport_infra::store::PaymentOrder;

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::{AppServices, CURRENCY};

/// GET /enroll?email= - classes the student has paid for
pub async fn list_enrolled(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::EmailQuery>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    payments_for(&services, &query, PaymentOrder::Inserted).await
}

/// GET /history?email= - payments, newest first
pub async fn payment_history(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::EmailQuery>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    payments_for(&services, &query, PaymentOrder::NewestFirst).await
}

async fn payments_for(
    services: &AppServices,
    query: &dto::EmailQuery,
    order: PaymentOrder,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let Some(email) = query.email() else {
        return Ok(Json(vec![]));
    };
    Ok(Json(services.store.payments_by_email(email, order).await?))
}

/// POST /create-payment-intent
pub async fn create_payment_intent(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::PaymentIntentRequest>,
) -> Result<Json<dto::PaymentIntentResponse>, ApiError> {
    let amount = amount_in_cents(body.price)?;
    let intent = services.payments.create_payment_intent(amount, CURRENCY).await?;
    tracing::info!(intent_id = %intent.id, amount, "payment intent created");

    Ok(Json(dto::PaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

/// POST /payments
pub async fn record_payment(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RecordPaymentRequest>,
) -> Result<Json<dto::PaymentReceipt>, ApiError> {
    let payment = body.into_payment(Utc::now())?;
    let store = &*services.store;
    let receipt = crate::app::services::record_payment(store, store, store, payment).await?;
    Ok(Json(receipt))
}
