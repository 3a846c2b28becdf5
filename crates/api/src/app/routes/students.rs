//! Pending enrollments ("selected classes").

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query},
};

use silversport_core::{Enrollment, EnrollmentId};
use silversport_infra::store::{DeleteOutcome, InsertOutcome};

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

/// GET /students?email=
pub async fn list_enrollments(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::EmailQuery>,
) -> Result<Json<Vec<Enrollment>>, ApiError> {
    let Some(email) = query.email() else {
        return Ok(Json(vec![]));
    };
    Ok(Json(services.store.enrollments_by_email(email).await?))
}

/// POST /students
pub async fn create_enrollment(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateEnrollmentRequest>,
) -> Result<Json<InsertOutcome>, ApiError> {
    let enrollment = body.into_enrollment()?;
    Ok(Json(services.store.insert_enrollment(enrollment).await?))
}

/// DELETE /students/:id
pub async fn delete_enrollment(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteOutcome>, ApiError> {
    let id: EnrollmentId = id.parse()?;
    Ok(Json(services.store.delete_enrollment(id).await?))
}

/// GET /payment/:id - the enrollment about to be paid for
pub async fn get_enrollment(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Option<Enrollment>>, ApiError> {
    let id: EnrollmentId = id.parse()?;
    Ok(Json(services.store.find_enrollment(id).await?))
}
