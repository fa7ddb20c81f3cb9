// GlucoGuide-api lib.rs
//
// HTTP surface for GlucoGuide: handlers, public request shapes and the
// OpenAPI document. The server binary lives in src/bin/main.rs.

pub mod api;
pub mod entities;
pub mod openapi;

pub use api::create_application;
pub use api::routes::{create_app, AppState};
