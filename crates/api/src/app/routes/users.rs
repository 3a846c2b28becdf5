use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    response::{IntoResponse, Response},
};
use serde_json::json;

use silversport_core::{Role, User, UserId};
use silversport_infra::store::UpdateOutcome;

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::CallerContext;

/// GET /users - every user
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(services.store.list_users().await?))
}

/// POST /users - create on first sign-in; existing emails are left alone
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateUserRequest>,
) -> Result<Response, ApiError> {
    if body.email.trim().is_empty() {
        return Err(ApiError::validation("email is required"));
    }

    let user = body.into_user();
    if services.store.find_user_by_email(&user.email).await?.is_some() {
        return Ok(Json(json!({ "message": "user already exists" })).into_response());
    }

    let outcome = services.store.insert_user(user).await?;
    tracing::info!(user_id = %outcome.inserted_id, "user created");
    Ok(Json(outcome).into_response())
}

/// GET /users/:role/:email - does the caller hold `role`?
///
/// A caller asking about someone else gets a negative answer without a lookup.
pub async fn check_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path((role, email)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let role: Role = role.parse()?;

    if !caller.is(&email) {
        tracing::debug!(caller = caller.email(), requested = %email, "role check for another user");
        return Ok(Json(json!({ role.as_str(): false })));
    }

    let holds = services
        .store
        .find_user_by_email(&email)
        .await?
        .is_some_and(|u| u.has_role(role));

    Ok(Json(json!({ role.as_str(): holds })))
}

/// PATCH /users/:role/:id - grant `role` to a user
pub async fn assign_role(
    Extension(services): Extension<Arc<AppServices>>,
    Path((role, id)): Path<(String, String)>,
) -> Result<Json<UpdateOutcome>, ApiError> {
    let role: Role = role.parse()?;
    let id: UserId = id.parse()?;

    let outcome = services.store.set_user_role(id, role).await?;
    tracing::info!(user_id = %id, %role, matched = outcome.matched_count, "role assigned");
    Ok(Json(outcome))
}
