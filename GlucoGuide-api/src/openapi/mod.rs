use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Reading endpoints
        crate::api::handlers::readings::record_reading,
        crate::api::handlers::readings::get_reading,
        crate::api::handlers::readings::delete_reading,
        crate::api::handlers::readings::get_statistics,

        // Advisory endpoints
        crate::api::handlers::advisories::list_advisories,
        crate::api::handlers::advisories::mark_read,
        crate::api::handlers::advisories::dismiss,
        crate::api::handlers::advisories::mark_action_taken,
        crate::api::handlers::advisories::delete_advisory,

        // Target range endpoints
        crate::api::handlers::target_ranges::get_target_range,
        crate::api::handlers::target_ranges::set_target_range
    ),
    components(
        schemas(
            // Public entities
            crate::entities::common::ErrorResponse,
            crate::entities::readings::RecordReadingBody,
            crate::entities::readings::StatisticsQueryParams,
            crate::entities::advisories::AdvisoryQueryParams,

            // Health
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentHealthStatus,

            // Domain entities
            gluco_guide_domain::entities::MetricFamily,
            gluco_guide_domain::entities::Unit,
            gluco_guide_domain::entities::MealItem,
            gluco_guide_domain::entities::ExerciseDetails,
            gluco_guide_domain::entities::Reading,
            gluco_guide_domain::entities::RecordedReading,
            gluco_guide_domain::entities::Advisory,
            gluco_guide_domain::entities::AdvisoryCategory,
            gluco_guide_domain::entities::AdvisoryPriority,
            gluco_guide_domain::entities::TriggerType,
            gluco_guide_domain::entities::TargetRange,
            gluco_guide_domain::entities::SetTargetRangeRequest,
            gluco_guide_domain::entities::StatisticsPeriod,
            gluco_guide_domain::entities::StatisticsSnapshot,
            gluco_guide_domain::entities::GroupStats
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "readings", description = "Reading capture and statistics"),
        (name = "advisories", description = "Advisories produced by reading rules"),
        (name = "target_ranges", description = "Per-user target ranges")
    ),
    info(
        title = "GlucoGuide API",
        version = "0.1.0",
        description = "Diabetes self-management API: readings, statistics and advisories",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;
