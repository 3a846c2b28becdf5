use std::sync::Arc;

use axum::{Json, extract::Extension};
use chrono::Utc;
use serde_json::{Map, Value, json};

use silversport_auth::TokenError;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;

/// POST /jwt - sign the submitted user payload
pub async fn issue_token(
    Extension(services): Extension<Arc<AppServices>>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    let token = services
        .issuer
        .issue(payload, Utc::now())
        .map_err(|e| match e {
            TokenError::MissingEmail => ApiError::validation("email is required"),
            other => ApiError::Internal(other.to_string()),
        })?;

    Ok(Json(json!({ "token": token })))
}
