//! Domain layer health check functionality
//!
//! Reports on the reading store backend and on the analytics configuration.

use std::collections::HashMap;
use async_trait::async_trait;
use gluco_guide_data::database;

use crate::config::AnalyticsConfig;

/// System health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub status: SystemStatus,
    pub components: HashMap<String, HealthComponent>,
}

impl SystemHealth {
    /// Overall status is the worst component status
    pub fn from_components(components: HashMap<String, HealthComponent>) -> Self {
        let worst = components
            .values()
            .map(|component| component.status)
            .max()
            .unwrap_or(ComponentStatus::Healthy);
        let status = match worst {
            ComponentStatus::Healthy => SystemStatus::Healthy,
            ComponentStatus::Degraded => SystemStatus::Degraded,
            ComponentStatus::Unhealthy => SystemStatus::Unhealthy,
        };
        Self { status, components }
    }
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check the status of the database
    /// Returns true if the database is healthy, false if not
    /// Returns an error if the check could not be performed
    async fn check_database_status(&self) -> Result<bool, String>;
}

/// Health service over the process-wide database pool
#[derive(Debug, Clone, Default)]
pub struct HealthService {
    config: AnalyticsConfig,
}

impl HealthService {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = HashMap::new();
        components.insert("database".to_string(), database_component(check_database_status().await));
        components.insert("analytics".to_string(), analytics_component(&self.config));
        SystemHealth::from_components(components)
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        check_database_status().await
    }
}

/// Check if the database is available and functioning properly
///
/// Returns:
/// - Ok(true) if the SQLite pool answers
/// - Ok(false) if no pool is configured and repositories run on in-memory storage
/// - Err if the pool exists but cannot serve a connection
pub async fn check_database_status() -> Result<bool, String> {
    match database::get_connection_info() {
        Some(info) if info.contains("healthy") => Ok(true),
        Some(info) => Err(info),
        None => Ok(false),
    }
}

fn database_component(status: Result<bool, String>) -> HealthComponent {
    match status {
        Ok(true) => HealthComponent {
            status: ComponentStatus::Healthy,
            details: database::get_connection_info(),
        },
        Ok(false) => HealthComponent {
            status: ComponentStatus::Degraded,
            details: Some("Database pool not initialized; data is kept in memory only".to_string()),
        },
        Err(e) => HealthComponent {
            status: ComponentStatus::Unhealthy,
            details: Some(e),
        },
    }
}

fn analytics_component(config: &AnalyticsConfig) -> HealthComponent {
    let thresholds = [
        config.exercise_change_threshold,
        config.meal_sugar_limit,
        config.meal_protein_minimum,
    ];
    if !(config.default_glucose_min < config.default_glucose_max) {
        HealthComponent {
            status: ComponentStatus::Degraded,
            details: Some(format!(
                "Default glucose target {}-{} mg/dL is inverted",
                config.default_glucose_min, config.default_glucose_max
            )),
        }
    } else if thresholds.iter().any(|t| !t.is_finite() || *t < 0.0) {
        HealthComponent {
            status: ComponentStatus::Degraded,
            details: Some("A rule threshold is negative or not a number".to_string()),
        }
    } else {
        HealthComponent {
            status: ComponentStatus::Healthy,
            details: None,
        }
    }
}

/// Get overall system health with the default configuration
pub async fn get_system_health() -> SystemHealth {
    HealthService::default().get_system_health().await
}
