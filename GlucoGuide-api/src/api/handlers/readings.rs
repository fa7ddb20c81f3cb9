use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, instrument, warn};

use gluco_guide_domain::entities::{Reading, RecordedReading, StatisticsSnapshot};
use gluco_guide_domain::services::ReadingServiceTrait;

use crate::entities::{ErrorResponse, RecordReadingBody, StatisticsQueryParams};

/// Service type for dependency injection
pub type ReadingService = Arc<dyn ReadingServiceTrait>;

/// Record a reading and evaluate advisory rules against it
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/readings",
    params(
        ("user_id" = String, Path, description = "Owner of the reading")
    ),
    request_body = RecordReadingBody,
    responses(
        (status = 201, description = "Reading recorded, with any advisories it produced", body = RecordedReading),
        (status = 400, description = "Invalid reading", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "readings"
)]
#[instrument(skip(service, payload))]
pub async fn record_reading(
    State(service): State<ReadingService>,
    Path(user_id): Path<String>,
    payload: Result<Json<RecordReadingBody>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let Json(body) = payload.map_err(|rejection| {
        warn!("Rejected reading payload: {}", rejection.body_text());
        ErrorResponse::bad_request(&rejection.body_text())
    })?;

    let recorded = service
        .record_reading_and_evaluate(body.into_request(user_id))
        .await?;

    info!(
        "Reading {} recorded with {} advisories",
        recorded.reading.id,
        recorded.advisories_created.len()
    );
    Ok((StatusCode::CREATED, Json(recorded)))
}

/// Get a single reading by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/readings/{id}",
    params(
        ("user_id" = String, Path, description = "Owner of the reading"),
        ("id" = String, Path, description = "Reading ID")
    ),
    responses(
        (status = 200, description = "Reading found", body = Reading),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Reading not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "readings"
)]
#[instrument(skip(service))]
pub async fn get_reading(
    State(service): State<ReadingService>,
    Path((user_id, id)): Path<(String, String)>,
) -> Result<Json<Reading>, ErrorResponse> {
    let reading = service.get_reading(&user_id, &id).await?;
    Ok(Json(reading))
}

/// Delete a reading. Advisories it produced are kept.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}/readings/{id}",
    params(
        ("user_id" = String, Path, description = "Owner of the reading"),
        ("id" = String, Path, description = "Reading ID")
    ),
    responses(
        (status = 204, description = "Reading deleted"),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Reading not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "readings"
)]
#[instrument(skip(service))]
pub async fn delete_reading(
    State(service): State<ReadingService>,
    Path((user_id, id)): Path<(String, String)>,
) -> Result<StatusCode, ErrorResponse> {
    service.delete_reading(&user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Summary statistics for one metric family over a period ending now
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/statistics",
    params(
        ("user_id" = String, Path, description = "Owner of the readings"),
        StatisticsQueryParams
    ),
    responses(
        (status = 200, description = "Statistics computed", body = StatisticsSnapshot),
        (status = 400, description = "Unknown family or period", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "readings"
)]
#[instrument(skip(service))]
pub async fn get_statistics(
    State(service): State<ReadingService>,
    Path(user_id): Path<String>,
    Query(params): Query<StatisticsQueryParams>,
) -> Result<Json<StatisticsSnapshot>, ErrorResponse> {
    let (family, period) = params.resolve()?;
    info!("Computing {} statistics over {} for user {}", family, period.as_str(), user_id);

    let snapshot = service.get_statistics(&user_id, family, period).await?;
    Ok(Json(snapshot))
}
