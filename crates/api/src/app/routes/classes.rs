use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query},
};

use silversport_core::{Class, ClassFilter, ClassId, ClassStatus};
use silversport_infra::store::{InsertOutcome, UpdateOutcome};

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

/// GET /class?approve=true&limit=n
pub async fn list_classes(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ClassListQuery>,
) -> Result<Json<Vec<Class>>, ApiError> {
    let filter = ClassFilter::from(query);
    Ok(Json(services.store.list_classes(filter).await?))
}

/// POST /class
pub async fn create_class(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateClassRequest>,
) -> Result<Json<InsertOutcome>, ApiError> {
    let class = body.into_class()?;
    tracing::info!(class_id = %class.id, instructor = %class.instructor_email, "class submitted");
    Ok(Json(services.store.insert_class(class).await?))
}

/// PATCH /class/:id - approve, deny, or send back to pending
pub async fn update_class_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateClassStatusRequest>,
) -> Result<Json<UpdateOutcome>, ApiError> {
    let id: ClassId = id.parse()?;
    let status: ClassStatus = body.status.parse()?;
    Ok(Json(services.store.set_class_status(id, status).await?))
}

/// GET /course?email= - classes taught by an instructor
pub async fn list_instructor_courses(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::EmailQuery>,
) -> Result<Json<Vec<Class>>, ApiError> {
    let Some(email) = query.email() else {
        return Ok(Json(vec![]));
    };
    Ok(Json(services.store.classes_by_instructor(email).await?))
}

/// GET /feedback/:id
pub async fn get_feedback(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Option<Class>>, ApiError> {
    let id: ClassId = id.parse()?;
    Ok(Json(services.store.find_class(id).await?))
}

/// PUT /feedback/:id - upserts
pub async fn put_feedback(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::FeedbackRequest>,
) -> Result<Json<UpdateOutcome>, ApiError> {
    let id: ClassId = id.parse()?;
    Ok(Json(services.store.upsert_class_feedback(id, body.feedback).await?))
}
