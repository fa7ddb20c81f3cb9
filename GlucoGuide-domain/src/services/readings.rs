use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use validator::Validate;
use async_trait::async_trait;

use gluco_guide_data::models::format_timestamp;
use gluco_guide_data::repository::RepositoryError;

use crate::config::AnalyticsConfig;
use crate::entities::conversions;
use crate::entities::{
    Advisory, CreateReadingRequest, MetricFamily, Reading, RecordedReading, StatisticsPeriod, StatisticsSnapshot,
};
use crate::services::aggregator::aggregate;
use crate::services::normalizer::{normalize, normalize_range, normalize_value, NormalizationError};
use crate::services::rules::evaluate;
use crate::services::target_ranges::{load_target_range, TargetRangeServiceError};
use crate::services::{
    describe_validation_errors, SharedAdvisoryRepository, SharedReadingRepository, SharedTargetRangeRepository,
};

/// Lenient plausibility bound for glucose in mg/dL, separate from any target range
pub const GLUCOSE_TECHNICAL_MAX_MGDL: f64 = 1000.0;

/// Plausibility bound for HbA1c in percent
pub const HBA1C_TECHNICAL_MAX_PERCENT: f64 = 20.0;

/// How far in the future an event timestamp may lie, to absorb clock skew
const FUTURE_TOLERANCE_MINUTES: i64 = 5;

/// Reading service errors
#[derive(Debug, Error)]
pub enum ReadingServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Not found error
    #[error("Reading not found: {0}")]
    NotFound(String),

    /// Stored data or configuration could not be interpreted
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

impl From<NormalizationError> for ReadingServiceError {
    fn from(err: NormalizationError) -> Self {
        ReadingServiceError::ConfigurationError(err.to_string())
    }
}

impl From<TargetRangeServiceError> for ReadingServiceError {
    fn from(err: TargetRangeServiceError) -> Self {
        match err {
            TargetRangeServiceError::ConfigurationError(msg) => ReadingServiceError::ConfigurationError(msg),
            other => ReadingServiceError::RepositoryError(other.to_string()),
        }
    }
}

/// Trait for reading operations: the write path with advisory emission and the statistics read path
#[async_trait]
pub trait ReadingServiceTrait: Send + Sync {
    /// Validate, normalize and persist a reading, then evaluate rules against it.
    ///
    /// Advisory emission is best effort: its failures are logged and yield an
    /// empty `advisories_created`, never an error.
    async fn record_reading_and_evaluate(&self, request: CreateReadingRequest) -> Result<RecordedReading, ReadingServiceError>;

    /// Statistics over `[now - period, now]`
    async fn get_statistics(
        &self,
        user_id: &str,
        family: MetricFamily,
        period: StatisticsPeriod,
    ) -> Result<StatisticsSnapshot, ReadingServiceError> {
        self.get_statistics_at(user_id, family, period, Utc::now()).await
    }

    /// Statistics over the period ending at `now`
    async fn get_statistics_at(
        &self,
        user_id: &str,
        family: MetricFamily,
        period: StatisticsPeriod,
        now: DateTime<Utc>,
    ) -> Result<StatisticsSnapshot, ReadingServiceError>;

    /// A reading owned by `user_id`
    async fn get_reading(&self, user_id: &str, id: &str) -> Result<Reading, ReadingServiceError>;

    /// Delete a reading owned by `user_id`. Advisories derived from it are kept.
    async fn delete_reading(&self, user_id: &str, id: &str) -> Result<(), ReadingServiceError>;
}

/// Reading service for domain logic
pub struct ReadingService {
    readings: SharedReadingRepository,
    advisories: SharedAdvisoryRepository,
    target_ranges: SharedTargetRangeRepository,
    config: AnalyticsConfig,
}

impl ReadingService {
    /// Create a new reading service
    pub fn new(
        readings: SharedReadingRepository,
        advisories: SharedAdvisoryRepository,
        target_ranges: SharedTargetRangeRepository,
        config: AnalyticsConfig,
    ) -> Self {
        Self {
            readings,
            advisories,
            target_ranges,
            config,
        }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> ReadingServiceError {
        ReadingServiceError::RepositoryError(err.to_string())
    }

    /// Check a create request and resolve its event time
    fn validate_create_request(&self, request: &CreateReadingRequest) -> Result<DateTime<Utc>, ReadingServiceError> {
        request
            .validate()
            .map_err(|errors| ReadingServiceError::ValidationError(describe_validation_errors(&errors)))?;

        let family = request.metric_family;

        // Units are user input here, so a mismatch is a validation error
        let normalized = normalize_value(family, request.value, request.unit)
            .map_err(|e| ReadingServiceError::ValidationError(e.to_string()))?;

        match family {
            MetricFamily::Glucose => check_glucose_bounds("value", normalized)?,
            MetricFamily::Hba1c if normalized > HBA1C_TECHNICAL_MAX_PERCENT => {
                return Err(ReadingServiceError::ValidationError(format!(
                    "HbA1c of {}% exceeds the plausible maximum of {}%",
                    normalized, HBA1C_TECHNICAL_MAX_PERCENT
                )));
            }
            _ => {}
        }

        if let Some(exercise) = &request.exercise {
            if family != MetricFamily::Exercise {
                return Err(ReadingServiceError::ValidationError(
                    "Exercise details are only allowed on exercise readings".to_string(),
                ));
            }
            for (field, value) in [("value_before", exercise.value_before), ("value_after", exercise.value_after)] {
                if let Some(value) = value {
                    let mgdl = normalize_value(MetricFamily::Glucose, value, exercise.glucose_unit)
                        .map_err(|e| ReadingServiceError::ValidationError(e.to_string()))?;
                    check_glucose_bounds(field, mgdl)?;
                }
            }
        }

        if !request.meal_items.is_empty() && family != MetricFamily::Meal {
            return Err(ReadingServiceError::ValidationError(
                "Meal items are only allowed on meal readings".to_string(),
            ));
        }

        let now = Utc::now();
        let occurred_at = match &request.occurred_at {
            Some(raw) => conversions::parse_timestamp(raw).map_err(ReadingServiceError::ValidationError)?,
            None => now,
        };
        if occurred_at > now + Duration::minutes(FUTURE_TOLERANCE_MINUTES) {
            return Err(ReadingServiceError::ValidationError(
                "Reading time cannot be in the future".to_string(),
            ));
        }

        Ok(occurred_at)
    }

    /// Evaluate rules for a committed reading and persist the drafts
    async fn try_emit_advisories(&self, reading: &Reading) -> Result<Vec<Advisory>, ReadingServiceError> {
        let event = normalize(reading)?;
        let stored_range = load_target_range(&self.target_ranges, &self.config, &reading.user_id, reading.metric_family).await?;
        let target = normalize_range(&stored_range)?;

        let drafts = evaluate(&event, &target, &self.config);
        debug!("{} rule(s) matched reading {}", drafts.len(), reading.id);

        let mut created = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let saved = self.advisories.create(conversions::convert_to_data_advisory(&draft)).await;
            match saved.map_err(|e| e.to_string()).and_then(conversions::convert_to_domain_advisory) {
                Ok(advisory) => created.push(advisory),
                Err(e) => error!(
                    user_id = %reading.user_id,
                    reading_id = %reading.id,
                    trigger_type = %draft.trigger_type,
                    "Failed to save advisory: {}", e
                ),
            }
        }
        Ok(created)
    }
}

fn check_glucose_bounds(field: &str, mgdl: f64) -> Result<(), ReadingServiceError> {
    if mgdl <= 0.0 || mgdl > GLUCOSE_TECHNICAL_MAX_MGDL {
        return Err(ReadingServiceError::ValidationError(format!(
            "{}: glucose of {} mg/dL is outside the plausible range (0, {}]",
            field, mgdl, GLUCOSE_TECHNICAL_MAX_MGDL
        )));
    }
    Ok(())
}

#[async_trait]
impl ReadingServiceTrait for ReadingService {
    async fn record_reading_and_evaluate(&self, request: CreateReadingRequest) -> Result<RecordedReading, ReadingServiceError> {
        let occurred_at = self.validate_create_request(&request)?;

        let data_request = conversions::convert_to_data_create_reading(&request, occurred_at)
            .map_err(ReadingServiceError::ValidationError)?;

        let record = self.readings.create(data_request)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        let reading = conversions::convert_to_domain_reading(record)
            .map_err(ReadingServiceError::ConfigurationError)?;

        info!("Recorded {} reading {} for user {}", reading.metric_family, reading.id, reading.user_id);

        let advisories_created = match self.try_emit_advisories(&reading).await {
            Ok(advisories) => advisories,
            Err(e) => {
                warn!(
                    user_id = %reading.user_id,
                    reading_id = %reading.id,
                    "Advisory emission failed, reading kept: {}", e
                );
                Vec::new()
            }
        };

        Ok(RecordedReading {
            reading,
            advisories_created,
        })
    }

    async fn get_statistics_at(
        &self,
        user_id: &str,
        family: MetricFamily,
        period: StatisticsPeriod,
        now: DateTime<Utc>,
    ) -> Result<StatisticsSnapshot, ReadingServiceError> {
        let window = period.window_ending(now);

        let records = self.readings
            .find_in_range(user_id, family.as_str(), &format_timestamp(window.start), &format_timestamp(window.end))
            .await
            .map_err(|e| self.map_repo_error(e))?;

        let mut events = Vec::with_capacity(records.len());
        for record in records {
            let reading = conversions::convert_to_domain_reading(record)
                .map_err(ReadingServiceError::ConfigurationError)?;
            events.push(normalize(&reading)?);
        }

        let stored_range = load_target_range(&self.target_ranges, &self.config, user_id, family).await?;
        let target = normalize_range(&stored_range)?;

        debug!("Aggregating {} {} reading(s) for user {} over {}", events.len(), family, user_id, period.as_str());
        Ok(aggregate(&events, &target, window))
    }

    async fn get_reading(&self, user_id: &str, id: &str) -> Result<Reading, ReadingServiceError> {
        let id_uuid = conversions::parse_string_to_uuid(id)
            .map_err(ReadingServiceError::ValidationError)?;

        let record = self.readings.get_by_id(id_uuid)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .filter(|record| record.user_id == user_id)
            .ok_or_else(|| ReadingServiceError::NotFound(format!("Reading with ID {} not found", id)))?;

        conversions::convert_to_domain_reading(record).map_err(ReadingServiceError::ConfigurationError)
    }

    async fn delete_reading(&self, user_id: &str, id: &str) -> Result<(), ReadingServiceError> {
        // Ownership check before deleting
        self.get_reading(user_id, id).await?;

        let id_uuid = conversions::parse_string_to_uuid(id)
            .map_err(ReadingServiceError::ValidationError)?;
        let deleted = self.readings.delete(id_uuid)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        if !deleted {
            return Err(ReadingServiceError::NotFound(format!("Reading with ID {} not found", id)));
        }
        info!("Deleted reading {} for user {}", id, user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use chrono::TimeZone;
    use gluco_guide_data::models::{CreateReadingRecord, TargetRangeRecord};
    use gluco_guide_data::repository::mocks::{MockAdvisoryRepository, MockReadingRepository, MockTargetRangeRepository};
    use gluco_guide_data::repository::ReadingRepositoryTrait;
    use crate::entities::{ExerciseDetails, MealItem, TriggerType, Unit};

    struct Fixture {
        readings: Arc<MockReadingRepository>,
        advisories: Arc<MockAdvisoryRepository>,
        service: ReadingService,
    }

    fn fixture_with(
        readings: MockReadingRepository,
        advisories: MockAdvisoryRepository,
        target_ranges: MockTargetRangeRepository,
    ) -> Fixture {
        let readings = Arc::new(readings);
        let advisories = Arc::new(advisories);
        let service = ReadingService::new(
            readings.clone(),
            advisories.clone(),
            Arc::new(target_ranges),
            AnalyticsConfig::default(),
        );
        Fixture { readings, advisories, service }
    }

    fn fixture() -> Fixture {
        fixture_with(MockReadingRepository::new(), MockAdvisoryRepository::new(), MockTargetRangeRepository::new())
    }

    fn request(family: MetricFamily, value: f64, unit: Unit) -> CreateReadingRequest {
        CreateReadingRequest {
            user_id: "user-1".to_string(),
            metric_family: family,
            value,
            unit,
            occurred_at: Some("2024-03-01T08:00:00Z".to_string()),
            category: None,
            exercise: None,
            meal_items: Vec::new(),
            notes: None,
        }
    }

    fn exercise_request(before: f64, after: f64) -> CreateReadingRequest {
        CreateReadingRequest {
            category: Some("running".to_string()),
            exercise: Some(ExerciseDetails {
                value_before: Some(before),
                value_after: Some(after),
                glucose_unit: Unit::MgDl,
                duration_minutes: Some(45),
                calories_burned: Some(320.0),
            }),
            ..request(MetricFamily::Exercise, 45.0, Unit::Minutes)
        }
    }

    fn stored_glucose(value: f64, unit: &str, occurred_at: &str, category: &str) -> CreateReadingRecord {
        CreateReadingRecord {
            user_id: "user-1".to_string(),
            metric_family: "glucose".to_string(),
            value,
            unit: unit.to_string(),
            occurred_at: occurred_at.to_string(),
            category: Some(category.to_string()),
            value_before: None,
            value_after: None,
            pair_unit: None,
            duration_minutes: None,
            calories_burned: None,
            meal_items: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_low_glucose_creates_one_high_advisory() {
        let fx = fixture();
        let recorded = fx.service
            .record_reading_and_evaluate(request(MetricFamily::Glucose, 55.0, Unit::MgDl))
            .await
            .unwrap();

        assert_eq!(recorded.advisories_created.len(), 1);
        let advisory = &recorded.advisories_created[0];
        assert_eq!(advisory.trigger_type, TriggerType::BloodSugarLow);
        assert_eq!(advisory.reading_id.as_deref(), Some(recorded.reading.id.as_str()));
        assert!(!advisory.is_read && !advisory.is_dismissed && !advisory.action_taken);
        assert_eq!(fx.advisories.stored().len(), 1);
    }

    #[tokio::test]
    async fn test_mmol_reading_is_evaluated_in_mgdl() {
        let fx = fixture();
        // 3.5 mmol/L is 63 mg/dL
        let recorded = fx.service
            .record_reading_and_evaluate(request(MetricFamily::Glucose, 3.5, Unit::MmolL))
            .await
            .unwrap();
        assert_eq!(recorded.reading.unit, Unit::MmolL);
        assert_eq!(recorded.advisories_created[0].trigger_payload["normalized_value"], serde_json::json!(63.0));
    }

    #[tokio::test]
    async fn test_stored_mmol_target_range_is_respected() {
        let fx = fixture_with(
            MockReadingRepository::new(),
            MockAdvisoryRepository::new(),
            MockTargetRangeRepository::with_range(TargetRangeRecord {
                user_id: "user-1".to_string(),
                metric_family: "glucose".to_string(),
                min: 5.0,
                max: 8.0,
                unit: "mmol/L".to_string(),
                updated_at: "2024-01-01T00:00:00.000Z".to_string(),
            }),
        );
        // 85 mg/dL is below 90 mg/dL
        let recorded = fx.service
            .record_reading_and_evaluate(request(MetricFamily::Glucose, 85.0, Unit::MgDl))
            .await
            .unwrap();
        assert_eq!(recorded.advisories_created.len(), 1);
        assert_eq!(recorded.advisories_created[0].trigger_payload["threshold"], serde_json::json!(90.0));
    }

    #[tokio::test]
    async fn test_exercise_drop_of_forty() {
        let fx = fixture();
        let recorded = fx.service.record_reading_and_evaluate(exercise_request(150.0, 110.0)).await.unwrap();
        assert_eq!(recorded.advisories_created.len(), 1);
        let advisory = &recorded.advisories_created[0];
        assert_eq!(advisory.trigger_type, TriggerType::ExerciseReminder);
        assert_eq!(advisory.trigger_payload["change"], serde_json::json!(-40.0));
    }

    #[tokio::test]
    async fn test_exercise_without_change_creates_nothing() {
        let fx = fixture();
        let recorded = fx.service.record_reading_and_evaluate(exercise_request(100.0, 100.0)).await.unwrap();
        assert!(recorded.advisories_created.is_empty());
        assert_eq!(fx.readings.stored().len(), 1);
    }

    #[tokio::test]
    async fn test_meal_creates_two_advisories_for_same_meal() {
        let fx = fixture();
        let meal = CreateReadingRequest {
            category: Some("dinner".to_string()),
            meal_items: vec![
                MealItem { name: "Cake".to_string(), calories: 400.0, carbs: 60.0, sugar: 40.0, protein: 6.0, fat: 18.0 },
                MealItem { name: "Lemonade".to_string(), calories: 120.0, carbs: 30.0, sugar: 20.0, protein: 4.0, fat: 0.0 },
            ],
            ..request(MetricFamily::Meal, 520.0, Unit::Kcal)
        };
        let recorded = fx.service.record_reading_and_evaluate(meal).await.unwrap();

        assert_eq!(recorded.advisories_created.len(), 2);
        for advisory in &recorded.advisories_created {
            assert_eq!(advisory.trigger_payload["meal_id"], serde_json::json!(recorded.reading.id));
        }
    }

    #[tokio::test]
    async fn test_sink_and_target_failures_keep_the_reading() {
        let fx = fixture_with(
            MockReadingRepository::new(),
            MockAdvisoryRepository::failing(),
            MockTargetRangeRepository::failing(),
        );
        let recorded = fx.service
            .record_reading_and_evaluate(request(MetricFamily::Glucose, 40.0, Unit::MgDl))
            .await
            .unwrap();
        assert!(recorded.advisories_created.is_empty());
        let stored = fx.readings.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, recorded.reading.id);
    }

    #[tokio::test]
    async fn test_sink_failure_alone_yields_empty_advisories() {
        let fx = fixture_with(MockReadingRepository::new(), MockAdvisoryRepository::failing(), MockTargetRangeRepository::new());
        let recorded = fx.service
            .record_reading_and_evaluate(request(MetricFamily::Glucose, 300.0, Unit::MgDl))
            .await
            .unwrap();
        assert!(recorded.advisories_created.is_empty());
    }

    #[tokio::test]
    async fn test_persistence_failure_propagates() {
        let fx = fixture_with(
            MockReadingRepository::new().failing_writes(),
            MockAdvisoryRepository::new(),
            MockTargetRangeRepository::new(),
        );
        let result = fx.service.record_reading_and_evaluate(request(MetricFamily::Glucose, 55.0, Unit::MgDl)).await;
        assert!(matches!(result, Err(ReadingServiceError::RepositoryError(_))));
        assert!(fx.advisories.stored().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_input_is_not_persisted() {
        let fx = fixture();
        let cases = vec![
            request(MetricFamily::Hba1c, 6.5, Unit::MgDl),
            request(MetricFamily::Glucose, -4.0, Unit::MgDl),
            request(MetricFamily::Glucose, 1500.0, Unit::MgDl),
            request(MetricFamily::Glucose, 0.0, Unit::MgDl),
            CreateReadingRequest { occurred_at: Some("yesterday".to_string()), ..request(MetricFamily::Glucose, 100.0, Unit::MgDl) },
            CreateReadingRequest { occurred_at: Some("2999-01-01T00:00:00Z".to_string()), ..request(MetricFamily::Glucose, 100.0, Unit::MgDl) },
            CreateReadingRequest { exercise: exercise_request(100.0, 90.0).exercise, ..request(MetricFamily::Glucose, 100.0, Unit::MgDl) },
        ];
        for case in cases {
            let result = fx.service.record_reading_and_evaluate(case.clone()).await;
            assert!(matches!(result, Err(ReadingServiceError::ValidationError(_))), "accepted {:?}", case);
        }
        assert!(fx.readings.stored().is_empty());
    }

    #[tokio::test]
    async fn test_statistics_over_window() {
        let repo = MockReadingRepository::new();
        repo.create(stored_glucose(100.0, "mg/dL", "2024-03-09T07:00:00.000Z", "fasting")).await.unwrap();
        repo.create(stored_glucose(11.0, "mmol/L", "2024-03-09T13:00:00.000Z", "after_meal")).await.unwrap();
        repo.create(stored_glucose(60.0, "mg/dL", "2024-03-10T07:00:00.000Z", "fasting")).await.unwrap();
        repo.create(stored_glucose(90.0, "mg/dL", "2024-02-01T07:00:00.000Z", "fasting")).await.unwrap();

        let fx = fixture_with(repo, MockAdvisoryRepository::new(), MockTargetRangeRepository::new());
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let snapshot = fx.service
            .get_statistics_at("user-1", MetricFamily::Glucose, StatisticsPeriod::Week, now)
            .await
            .unwrap();

        assert_eq!(snapshot.count, 3);
        assert_eq!(snapshot.max, 198.0);
        assert_eq!(snapshot.min, 60.0);
        assert_eq!((snapshot.in_range, snapshot.below_range, snapshot.above_range), (1, 1, 1));
        assert_eq!(snapshot.by_category["fasting"].count, 2);
        assert_eq!(snapshot.by_day.len(), 2);
        assert_eq!(snapshot.window_end, now);
    }

    #[tokio::test]
    async fn test_exercise_statistics_group_by_exercise_type() {
        let fx = fixture();
        let sessions = [
            ("running", 45.0, "2024-03-01T07:00:00Z"),
            ("running", 30.0, "2024-03-02T07:00:00Z"),
            ("swimming", 60.0, "2024-03-03T18:00:00Z"),
        ];
        for (kind, minutes, at) in sessions {
            let session = CreateReadingRequest {
                category: Some(kind.to_string()),
                occurred_at: Some(at.to_string()),
                ..request(MetricFamily::Exercise, minutes, Unit::Minutes)
            };
            fx.service.record_reading_and_evaluate(session).await.unwrap();
        }
        fx.service.record_reading_and_evaluate(request(MetricFamily::Glucose, 120.0, Unit::MgDl)).await.unwrap();

        let now = Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap();
        let snapshot = fx.service
            .get_statistics_at("user-1", MetricFamily::Exercise, StatisticsPeriod::Week, now)
            .await
            .unwrap();

        assert_eq!(snapshot.count, 3);
        assert_eq!(snapshot.unit, Unit::Minutes);
        let kinds: Vec<&str> = snapshot.by_category.keys().map(String::as_str).collect();
        assert_eq!(kinds, vec!["running", "swimming"]);
        assert_eq!(snapshot.by_category["running"].count, 2);
        assert_eq!(snapshot.by_category["running"].sum, 75.0);
        assert_eq!(snapshot.by_category["swimming"].count, 1);
    }

    #[tokio::test]
    async fn test_meal_statistics_group_by_meal_type() {
        let fx = fixture();
        let meals = [
            ("breakfast", 350.0, "2024-03-01T07:30:00Z"),
            ("lunch", 600.0, "2024-03-01T12:30:00Z"),
            ("lunch", 500.0, "2024-03-02T12:30:00Z"),
        ];
        for (kind, kcal, at) in meals {
            let meal = CreateReadingRequest {
                category: Some(kind.to_string()),
                occurred_at: Some(at.to_string()),
                ..request(MetricFamily::Meal, kcal, Unit::Kcal)
            };
            fx.service.record_reading_and_evaluate(meal).await.unwrap();
        }

        let now = Utc.with_ymd_and_hms(2024, 3, 3, 0, 0, 0).unwrap();
        let snapshot = fx.service
            .get_statistics_at("user-1", MetricFamily::Meal, StatisticsPeriod::Week, now)
            .await
            .unwrap();

        assert_eq!(snapshot.count, 3);
        let kinds: Vec<&str> = snapshot.by_category.keys().map(String::as_str).collect();
        assert_eq!(kinds, vec!["breakfast", "lunch"]);
        assert_eq!(snapshot.by_category["breakfast"].count, 1);
        assert_eq!(snapshot.by_category["lunch"].count, 2);
        assert_eq!(snapshot.by_category["lunch"].average, 550.0);
        assert_eq!(snapshot.by_day["2024-03-01"].count, 2);
    }

    #[tokio::test]
    async fn test_statistics_for_empty_window() {
        let fx = fixture();
        let snapshot = fx.service
            .get_statistics("user-1", MetricFamily::Meal, StatisticsPeriod::Day)
            .await
            .unwrap();
        assert_eq!(snapshot.count, 0);
        assert_eq!(snapshot.average, 0.0);
    }

    #[tokio::test]
    async fn test_statistics_read_failure_propagates() {
        let fx = fixture_with(
            MockReadingRepository::new().failing_reads(),
            MockAdvisoryRepository::new(),
            MockTargetRangeRepository::new(),
        );
        let result = fx.service.get_statistics("user-1", MetricFamily::Glucose, StatisticsPeriod::Month).await;
        assert!(matches!(result, Err(ReadingServiceError::RepositoryError(_))));
    }

    #[tokio::test]
    async fn test_get_and_delete_are_scoped_to_owner() {
        let fx = fixture();
        let recorded = fx.service
            .record_reading_and_evaluate(request(MetricFamily::Glucose, 120.0, Unit::MgDl))
            .await
            .unwrap();
        let id = recorded.reading.id.clone();

        assert!(matches!(fx.service.get_reading("user-2", &id).await, Err(ReadingServiceError::NotFound(_))));
        assert!(matches!(fx.service.delete_reading("user-2", &id).await, Err(ReadingServiceError::NotFound(_))));
        assert_eq!(fx.service.get_reading("user-1", &id).await.unwrap(), recorded.reading);

        fx.service.delete_reading("user-1", &id).await.unwrap();
        assert!(matches!(fx.service.get_reading("user-1", &id).await, Err(ReadingServiceError::NotFound(_))));
        assert!(matches!(fx.service.get_reading("user-1", "bogus").await, Err(ReadingServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_deleting_a_reading_keeps_its_advisories() {
        let fx = fixture();
        let recorded = fx.service
            .record_reading_and_evaluate(request(MetricFamily::Glucose, 50.0, Unit::MgDl))
            .await
            .unwrap();
        fx.service.delete_reading("user-1", &recorded.reading.id).await.unwrap();
        assert_eq!(fx.advisories.stored().len(), 1);
    }
}
