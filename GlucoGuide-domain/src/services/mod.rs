// Domain services
// Pure analytics (normalizer, aggregator, rules) plus the orchestration
// services the API layer calls.

pub mod advisories;
pub mod aggregator;
pub mod normalizer;
pub mod readings;
pub mod rules;
pub mod target_ranges;

use std::sync::Arc;
use validator::{ValidationErrors, ValidationErrorsKind};

use gluco_guide_data::repository::{
    AdvisoryRepository, AdvisoryRepositoryTrait, ReadingRepository, ReadingRepositoryTrait, TargetRangeRepository,
    TargetRangeRepositoryTrait,
};

use crate::config::AnalyticsConfig;

// Re-export service traits and errors
pub use advisories::{AdvisoryService, AdvisoryServiceError, AdvisoryServiceTrait};
pub use readings::{ReadingService, ReadingServiceError, ReadingServiceTrait};
pub use target_ranges::{TargetRangeService, TargetRangeServiceError, TargetRangeServiceTrait};

/// Repository handles shared between services
pub type SharedReadingRepository = Arc<dyn ReadingRepositoryTrait + Send + Sync>;
pub type SharedAdvisoryRepository = Arc<dyn AdvisoryRepositoryTrait + Send + Sync>;
pub type SharedTargetRangeRepository = Arc<dyn TargetRangeRepositoryTrait + Send + Sync>;

/// The service set the API layer depends on
#[derive(Clone)]
pub struct DomainServices {
    pub readings: Arc<dyn ReadingServiceTrait>,
    pub advisories: Arc<dyn AdvisoryServiceTrait>,
    pub target_ranges: Arc<dyn TargetRangeServiceTrait>,
}

impl DomainServices {
    /// Wire services over the given repositories. The reading service and the
    /// target range service share one target range store.
    pub fn with_repositories(
        readings: SharedReadingRepository,
        advisories: SharedAdvisoryRepository,
        target_ranges: SharedTargetRangeRepository,
        config: AnalyticsConfig,
    ) -> Self {
        Self {
            readings: Arc::new(ReadingService::new(
                readings,
                advisories.clone(),
                target_ranges.clone(),
                config.clone(),
            )),
            advisories: Arc::new(AdvisoryService::new(advisories)),
            target_ranges: Arc::new(TargetRangeService::new(target_ranges, config)),
        }
    }
}

/// Create services backed by the default repositories
pub fn create_default_services(config: AnalyticsConfig) -> DomainServices {
    DomainServices::with_repositories(
        Arc::new(ReadingRepository::new()),
        Arc::new(AdvisoryRepository::new()),
        Arc::new(TargetRangeRepository::new()),
        config,
    )
}

/// Flatten validator output into one message, nested fields as `parent.field`
pub(crate) fn describe_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages("", errors, &mut messages);
    messages.sort();
    messages.join("; ")
}

fn collect_messages(prefix: &str, errors: &ValidationErrors, messages: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let error_msgs: Vec<String> = field_errors
                    .iter()
                    .map(|err| match &err.message {
                        Some(msg) => msg.to_string(),
                        None => format!("Invalid {}", path),
                    })
                    .collect();
                messages.push(format!("{}: {}", path, error_msgs.join(", ")));
            }
            ValidationErrorsKind::Struct(nested) => collect_messages(&path, nested, messages),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_messages(&format!("{}[{}]", path, index), nested, messages);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;
    use crate::entities::{CreateReadingRequest, MealItem, MetricFamily, Unit};

    #[test]
    fn test_nested_validation_messages() {
        let request = CreateReadingRequest {
            user_id: String::new(),
            metric_family: MetricFamily::Meal,
            value: 500.0,
            unit: Unit::Kcal,
            occurred_at: None,
            category: None,
            exercise: None,
            meal_items: vec![MealItem {
                name: "Rice".to_string(),
                calories: 200.0,
                carbs: 45.0,
                sugar: 0.0,
                protein: -3.0,
                fat: 0.5,
            }],
            notes: None,
        };
        let message = describe_validation_errors(&request.validate().unwrap_err());
        assert!(message.contains("meal_items[0].protein: Protein cannot be negative"), "{}", message);
        assert!(message.contains("user_id: User id must be between 1 and 128 characters"), "{}", message);
    }

    #[tokio::test]
    async fn test_default_services_share_target_ranges() {
        use crate::entities::SetTargetRangeRequest;

        let services = create_default_services(AnalyticsConfig::default());
        services
            .target_ranges
            .set_target_range("user-1", MetricFamily::Glucose, SetTargetRangeRequest { min: 90.0, max: 140.0, unit: Unit::MgDl })
            .await
            .unwrap();

        let request = CreateReadingRequest {
            user_id: "user-1".to_string(),
            metric_family: MetricFamily::Glucose,
            value: 85.0,
            unit: Unit::MgDl,
            occurred_at: None,
            category: Some("fasting".to_string()),
            exercise: None,
            meal_items: Vec::new(),
            notes: None,
        };
        let recorded = services.readings.record_reading_and_evaluate(request).await.unwrap();
        assert_eq!(recorded.advisories_created.len(), 1);

        let listed = services.advisories.list_advisories("user-1", Default::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
    }
}
