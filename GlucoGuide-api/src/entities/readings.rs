use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use gluco_guide_domain::entities::{
    CreateReadingRequest, ExerciseDetails, MealItem, MetricFamily, StatisticsPeriod, Unit,
};

use super::common::ErrorResponse;

/// Request payload for recording a reading. The user comes from the path.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordReadingBody {
    /// glucose, hba1c, exercise or meal
    pub metric_family: MetricFamily,

    /// Measured value in `unit`
    pub value: f64,

    pub unit: Unit,

    /// RFC3339 timestamp. Defaults to the current time if not provided.
    #[serde(default)]
    pub occurred_at: Option<String>,

    /// Reading type, exercise type or meal type
    #[serde(default)]
    pub category: Option<String>,

    /// Exercise details, only for exercise readings
    #[serde(default)]
    pub exercise: Option<ExerciseDetails>,

    /// Meal items, only for meal readings
    #[serde(default)]
    pub meal_items: Vec<MealItem>,

    #[serde(default)]
    pub notes: Option<String>,
}

impl RecordReadingBody {
    pub fn into_request(self, user_id: String) -> CreateReadingRequest {
        CreateReadingRequest {
            user_id,
            metric_family: self.metric_family,
            value: self.value,
            unit: self.unit,
            occurred_at: self.occurred_at,
            category: self.category,
            exercise: self.exercise,
            meal_items: self.meal_items,
            notes: self.notes,
        }
    }
}

/// Query parameters for statistics
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct StatisticsQueryParams {
    /// Metric family (default: glucose)
    pub family: Option<String>,

    /// 24hours, 7days, 30days or 90days (default: 7days)
    pub period: Option<String>,
}

impl StatisticsQueryParams {
    pub fn resolve(&self) -> Result<(MetricFamily, StatisticsPeriod), ErrorResponse> {
        let family = match self.family.as_deref() {
            Some(raw) => parse_family(raw)?,
            None => MetricFamily::Glucose,
        };
        let period = match self.period.as_deref() {
            Some(raw) => raw
                .parse::<StatisticsPeriod>()
                .map_err(|e| ErrorResponse::validation_error(&e, None))?,
            None => StatisticsPeriod::Week,
        };
        Ok((family, period))
    }
}

/// Metric family from a path or query segment
pub fn parse_family(raw: &str) -> Result<MetricFamily, ErrorResponse> {
    raw.parse::<MetricFamily>()
        .map_err(|e| ErrorResponse::validation_error(&e, None))
}
