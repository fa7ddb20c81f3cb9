use std::sync::Arc;
use axum::extract::{rejection::JsonRejection, Json, Path, State};
use tracing::{info, instrument};

use gluco_guide_domain::entities::{SetTargetRangeRequest, TargetRange};
use gluco_guide_domain::services::TargetRangeServiceTrait;

use crate::entities::readings::parse_family;
use crate::entities::ErrorResponse;

/// Service type for dependency injection
pub type TargetRangeService = Arc<dyn TargetRangeServiceTrait>;

/// Get the user's target range for a family, or the default
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/target-ranges/{family}",
    params(
        ("user_id" = String, Path, description = "Owner of the target range"),
        ("family" = String, Path, description = "glucose, hba1c, exercise or meal")
    ),
    responses(
        (status = 200, description = "Target range", body = TargetRange),
        (status = 400, description = "Unknown family", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "target_ranges"
)]
#[instrument(skip(service))]
pub async fn get_target_range(
    State(service): State<TargetRangeService>,
    Path((user_id, family)): Path<(String, String)>,
) -> Result<Json<TargetRange>, ErrorResponse> {
    let family = parse_family(&family)?;
    Ok(Json(service.get_target_range(&user_id, family).await?))
}

/// Store the user's target range for a family
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}/target-ranges/{family}",
    params(
        ("user_id" = String, Path, description = "Owner of the target range"),
        ("family" = String, Path, description = "glucose, hba1c, exercise or meal")
    ),
    request_body = SetTargetRangeRequest,
    responses(
        (status = 200, description = "Target range stored", body = TargetRange),
        (status = 400, description = "Invalid range", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "target_ranges"
)]
#[instrument(skip(service, payload))]
pub async fn set_target_range(
    State(service): State<TargetRangeService>,
    Path((user_id, family)): Path<(String, String)>,
    payload: Result<Json<SetTargetRangeRequest>, JsonRejection>,
) -> Result<Json<TargetRange>, ErrorResponse> {
    let family = parse_family(&family)?;
    let Json(request) = payload.map_err(|rejection| ErrorResponse::bad_request(&rejection.body_text()))?;

    let range = service.set_target_range(&user_id, family, request).await?;
    info!("Stored {} target range {}-{} {} for user {}", family, range.min, range.max, range.unit, user_id);
    Ok(Json(range))
}
