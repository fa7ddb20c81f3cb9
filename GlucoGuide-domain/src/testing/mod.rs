// Testing utilities and mock implementations for the domain layer
// This module is only available when the "mock" feature is enabled

use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;

// Re-export useful test mocks from the data layer
pub use gluco_guide_data::repository::mocks::{MockAdvisoryRepository, MockReadingRepository, MockTargetRangeRepository};

use crate::config::AnalyticsConfig;
use crate::entities::{CreateReadingRequest, ExerciseDetails, MealItem, MetricFamily, Unit};
use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth};
use crate::services::DomainServices;

/// Mock repositories kept alongside the services built on them, so tests can
/// inspect what was stored
#[derive(Clone, Default)]
pub struct MockRepositories {
    pub readings: Arc<MockReadingRepository>,
    pub advisories: Arc<MockAdvisoryRepository>,
    pub target_ranges: Arc<MockTargetRangeRepository>,
}

impl MockRepositories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advisory sink and target range store both fail on every call
    pub fn with_failing_emission() -> Self {
        Self {
            advisories: Arc::new(MockAdvisoryRepository::failing()),
            target_ranges: Arc::new(MockTargetRangeRepository::failing()),
            ..Self::default()
        }
    }

    /// Reading store rejects every write
    pub fn with_failing_reading_writes() -> Self {
        Self {
            readings: Arc::new(MockReadingRepository::new().failing_writes()),
            ..Self::default()
        }
    }

    /// Services wired over these repositories
    pub fn services(&self, config: AnalyticsConfig) -> DomainServices {
        DomainServices::with_repositories(
            self.readings.clone(),
            self.advisories.clone(),
            self.target_ranges.clone(),
            config,
        )
    }
}

/// Factory function for services over fresh mock repositories
pub fn create_mock_services() -> (DomainServices, MockRepositories) {
    let repositories = MockRepositories::new();
    (repositories.services(AnalyticsConfig::default()), repositories)
}

/// Glucose reading request happening now
pub fn glucose_request(user_id: &str, value: f64, unit: Unit) -> CreateReadingRequest {
    CreateReadingRequest {
        user_id: user_id.to_string(),
        metric_family: MetricFamily::Glucose,
        value,
        unit,
        occurred_at: None,
        category: Some("random".to_string()),
        exercise: None,
        meal_items: Vec::new(),
        notes: None,
    }
}

/// Exercise session request with a mg/dL before/after pair
pub fn exercise_request(user_id: &str, before: Option<f64>, after: Option<f64>) -> CreateReadingRequest {
    CreateReadingRequest {
        metric_family: MetricFamily::Exercise,
        value: 45.0,
        unit: Unit::Minutes,
        category: Some("walking".to_string()),
        exercise: Some(ExerciseDetails {
            value_before: before,
            value_after: after,
            glucose_unit: Unit::MgDl,
            duration_minutes: Some(45),
            calories_burned: Some(250.0),
        }),
        ..glucose_request(user_id, 45.0, Unit::Minutes)
    }
}

/// Meal request whose value is the summed item calories
pub fn meal_request(user_id: &str, items: Vec<MealItem>) -> CreateReadingRequest {
    let calories: f64 = items.iter().map(|item| item.calories).sum();
    CreateReadingRequest {
        metric_family: MetricFamily::Meal,
        value: calories,
        unit: Unit::Kcal,
        category: Some("lunch".to_string()),
        meal_items: items,
        ..glucose_request(user_id, calories, Unit::Kcal)
    }
}

/// Meal item with the given sugar and protein
pub fn meal_item(name: &str, sugar: f64, protein: f64) -> MealItem {
    MealItem {
        name: name.to_string(),
        calories: 250.0,
        carbs: 35.0,
        sugar,
        protein,
        fat: 8.0,
    }
}

/// Mock implementation of health services for testing system health
#[derive(Debug)]
pub struct MockHealthService {
    database_status: ComponentStatus,
    components: HashMap<String, HealthComponent>,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Create a new mock health service with all components healthy
    pub fn new() -> Self {
        Self {
            database_status: ComponentStatus::Healthy,
            components: HashMap::new(),
        }
    }

    /// Configure the mock with a degraded database
    pub fn with_degraded_database(mut self) -> Self {
        self.database_status = ComponentStatus::Degraded;
        self
    }

    /// Configure the mock with an unhealthy database
    pub fn with_unhealthy_database(mut self) -> Self {
        self.database_status = ComponentStatus::Unhealthy;
        self
    }

    /// Add a custom component with a specific status
    pub fn with_component(mut self, name: &str, status: ComponentStatus, details: Option<String>) -> Self {
        self.components.insert(name.to_string(), HealthComponent { status, details });
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = self.components.clone();
        components.insert(
            "database".to_string(),
            HealthComponent {
                status: self.database_status,
                details: match self.database_status {
                    ComponentStatus::Healthy => None,
                    ComponentStatus::Degraded => Some("Database pool not initialized".to_string()),
                    ComponentStatus::Unhealthy => Some("Database connection failed".to_string()),
                },
            },
        );
        SystemHealth::from_components(components)
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        match self.database_status {
            ComponentStatus::Healthy => Ok(true),
            ComponentStatus::Degraded => Ok(false),
            ComponentStatus::Unhealthy => Err("Database connection failed".to_string()),
        }
    }
}

/// Factory function to create a mock health service
pub fn create_mock_health_service() -> impl HealthServiceTrait {
    MockHealthService::new()
}
