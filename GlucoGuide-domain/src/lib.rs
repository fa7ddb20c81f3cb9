// GlucoGuide Domain
// This crate contains the analytics and advisory logic for the GlucoGuide application

// Analytics configuration
pub mod config;

// Services that implement business logic
pub mod services;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Re-export the database module from the data crate for convenience
pub use gluco_guide_data::database;

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;
