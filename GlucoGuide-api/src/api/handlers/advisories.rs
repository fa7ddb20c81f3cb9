use std::sync::Arc;
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use tracing::{info, instrument};

use gluco_guide_domain::entities::Advisory;
use gluco_guide_domain::services::AdvisoryServiceTrait;

use crate::entities::{AdvisoryQueryParams, ErrorResponse};

/// Service type for dependency injection
pub type AdvisoryService = Arc<dyn AdvisoryServiceTrait>;

/// List a user's advisories, most urgent first
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/advisories",
    params(
        ("user_id" = String, Path, description = "Owner of the advisories"),
        AdvisoryQueryParams
    ),
    responses(
        (status = 200, description = "Advisories listed", body = [Advisory]),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "advisories"
)]
#[instrument(skip(service))]
pub async fn list_advisories(
    State(service): State<AdvisoryService>,
    Path(user_id): Path<String>,
    Query(params): Query<AdvisoryQueryParams>,
) -> Result<Json<Vec<Advisory>>, ErrorResponse> {
    let advisories = service.list_advisories(&user_id, params.into()).await?;
    info!("Listed {} advisories for user {}", advisories.len(), user_id);
    Ok(Json(advisories))
}

/// Mark an advisory as read
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/advisories/{id}/read",
    params(
        ("user_id" = String, Path, description = "Owner of the advisory"),
        ("id" = String, Path, description = "Advisory ID")
    ),
    responses(
        (status = 200, description = "Advisory updated", body = Advisory),
        (status = 404, description = "Advisory not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "advisories"
)]
#[instrument(skip(service))]
pub async fn mark_read(
    State(service): State<AdvisoryService>,
    Path((user_id, id)): Path<(String, String)>,
) -> Result<Json<Advisory>, ErrorResponse> {
    Ok(Json(service.mark_read(&user_id, &id).await?))
}

/// Dismiss an advisory
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/advisories/{id}/dismiss",
    params(
        ("user_id" = String, Path, description = "Owner of the advisory"),
        ("id" = String, Path, description = "Advisory ID")
    ),
    responses(
        (status = 200, description = "Advisory updated", body = Advisory),
        (status = 404, description = "Advisory not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "advisories"
)]
#[instrument(skip(service))]
pub async fn dismiss(
    State(service): State<AdvisoryService>,
    Path((user_id, id)): Path<(String, String)>,
) -> Result<Json<Advisory>, ErrorResponse> {
    Ok(Json(service.dismiss(&user_id, &id).await?))
}

/// Record that the suggested action was taken
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/advisories/{id}/action",
    params(
        ("user_id" = String, Path, description = "Owner of the advisory"),
        ("id" = String, Path, description = "Advisory ID")
    ),
    responses(
        (status = 200, description = "Advisory updated", body = Advisory),
        (status = 404, description = "Advisory not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "advisories"
)]
#[instrument(skip(service))]
pub async fn mark_action_taken(
    State(service): State<AdvisoryService>,
    Path((user_id, id)): Path<(String, String)>,
) -> Result<Json<Advisory>, ErrorResponse> {
    Ok(Json(service.mark_action_taken(&user_id, &id).await?))
}

/// Delete an advisory
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}/advisories/{id}",
    params(
        ("user_id" = String, Path, description = "Owner of the advisory"),
        ("id" = String, Path, description = "Advisory ID")
    ),
    responses(
        (status = 204, description = "Advisory deleted"),
        (status = 404, description = "Advisory not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "advisories"
)]
#[instrument(skip(service))]
pub async fn delete_advisory(
    State(service): State<AdvisoryService>,
    Path((user_id, id)): Path<(String, String)>,
) -> Result<StatusCode, ErrorResponse> {
    service.delete_advisory(&user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
