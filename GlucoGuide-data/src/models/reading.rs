use serde::{Deserialize, Serialize};

/// Storage model for a health reading of any metric family.
///
/// Family-specific fields are nullable columns; `category` holds the glucose
/// reading type, the exercise type or the meal type depending on the family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingRecord {
    /// Unique identifier for the reading
    pub id: String,

    /// Owner of the reading
    pub user_id: String,

    /// Metric family name (glucose, hba1c, exercise, meal)
    pub metric_family: String,

    /// Recorded value in `unit`
    pub value: f64,

    /// Unit label as entered (mg/dL, mmol/L, percent, minutes, kcal)
    pub unit: String,

    /// When the event happened, RFC 3339 in UTC
    pub occurred_at: String,

    /// Family-specific category
    pub category: Option<String>,

    /// Glucose before exercise
    pub value_before: Option<f64>,

    /// Glucose after exercise
    pub value_after: Option<f64>,

    /// Unit of the before/after pair
    pub pair_unit: Option<String>,

    /// Exercise duration
    pub duration_minutes: Option<u32>,

    /// Exercise energy expenditure
    pub calories_burned: Option<f64>,

    /// Itemized meal composition, stored as JSON text
    pub meal_items: Option<serde_json::Value>,

    /// Optional notes about the reading
    pub notes: Option<String>,

    /// When the row was written, RFC 3339 in UTC
    pub created_at: String,
}

/// Input data for creating a new reading row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateReadingRecord {
    pub user_id: String,
    pub metric_family: String,
    pub value: f64,
    pub unit: String,
    pub occurred_at: String,
    pub category: Option<String>,
    pub value_before: Option<f64>,
    pub value_after: Option<f64>,
    pub pair_unit: Option<String>,
    pub duration_minutes: Option<u32>,
    pub calories_burned: Option<f64>,
    pub meal_items: Option<serde_json::Value>,
    pub notes: Option<String>,
}

impl CreateReadingRecord {
    /// Attach an id and creation time, producing the stored row
    pub fn into_record(self, id: String, created_at: String) -> ReadingRecord {
        ReadingRecord {
            id,
            user_id: self.user_id,
            metric_family: self.metric_family,
            value: self.value,
            unit: self.unit,
            occurred_at: self.occurred_at,
            category: self.category,
            value_before: self.value_before,
            value_after: self.value_after,
            pair_unit: self.pair_unit,
            duration_minutes: self.duration_minutes,
            calories_burned: self.calories_burned,
            meal_items: self.meal_items,
            notes: self.notes,
            created_at,
        }
    }
}
