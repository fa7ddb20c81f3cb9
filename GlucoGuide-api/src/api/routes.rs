use axum::{
    extract::FromRef,
    routing::{delete, get, post},
    Extension, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use gluco_guide_domain::services::DomainServices;

use crate::api::handlers::{advisories, health, readings, target_ranges};
use crate::openapi::configure_swagger_routes;

/// Router state: the domain services the handlers extract by type
#[derive(Clone)]
pub struct AppState {
    pub services: DomainServices,
}

impl FromRef<AppState> for readings::ReadingService {
    fn from_ref(state: &AppState) -> Self {
        state.services.readings.clone()
    }
}

impl FromRef<AppState> for advisories::AdvisoryService {
    fn from_ref(state: &AppState) -> Self {
        state.services.advisories.clone()
    }
}

impl FromRef<AppState> for target_ranges::TargetRangeService {
    fn from_ref(state: &AppState) -> Self {
        state.services.target_ranges.clone()
    }
}

/// Create the application router over the given services
pub fn create_app(services: DomainServices, health_service: health::HealthServiceHandle) -> Router {
    debug!("Creating application router");

    let api_routes = Router::new()
        .route("/users/:user_id/readings", post(readings::record_reading))
        .route(
            "/users/:user_id/readings/:id",
            get(readings::get_reading).delete(readings::delete_reading),
        )
        .route("/users/:user_id/statistics", get(readings::get_statistics))
        .route("/users/:user_id/advisories", get(advisories::list_advisories))
        .route("/users/:user_id/advisories/:id", delete(advisories::delete_advisory))
        .route("/users/:user_id/advisories/:id/read", post(advisories::mark_read))
        .route("/users/:user_id/advisories/:id/dismiss", post(advisories::dismiss))
        .route("/users/:user_id/advisories/:id/action", post(advisories::mark_action_taken))
        .route(
            "/users/:user_id/target-ranges/:family",
            get(target_ranges::get_target_range).put(target_ranges::set_target_range),
        );

    debug!("API routes configured");

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .layer(Extension(health_service));

    let app = Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .with_state(AppState { services });

    debug!("API routes nested");

    let app = add_swagger_ui(app)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    health::initialize_server_start_time();
    debug!("Health check service initialized");

    app
}

/// Add Swagger UI to the router
pub fn add_swagger_ui(app: Router) -> Router {
    app.merge(configure_swagger_routes())
}
