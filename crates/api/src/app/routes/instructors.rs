use std::sync::Arc;

use axum::{Json, extract::Extension};

use silversport_core::Instructor;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;

/// Size of the popular-instructors listing.
pub const POPULAR_LIMIT: usize = 6;

pub async fn list_instructors(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<Instructor>>, ApiError> {
    Ok(Json(services.store.list_instructors().await?))
}

pub async fn popular_instructors(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<Instructor>>, ApiError> {
    Ok(Json(services.store.popular_instructors(POPULAR_LIMIT).await?))
}
