// GlucoGuide Data
// This crate handles persistence of readings, advisories and target ranges

// Database connection management
pub mod database;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
