pub mod handlers;
pub mod routes;

use axum::Router;
use gluco_guide_domain::config::AnalyticsConfig;
use gluco_guide_domain::services::create_default_services;

/// Create the application router over the default repositories
pub fn create_application(config: AnalyticsConfig) -> Router {
    let health_service = handlers::health::create_health_service(config.clone());
    routes::create_app(create_default_services(config), health_service)
}
