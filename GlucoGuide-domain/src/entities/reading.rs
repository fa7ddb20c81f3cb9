use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Category of health measurement, each with its own unit and validation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum MetricFamily {
    Glucose,
    Hba1c,
    Exercise,
    Meal,
}

impl MetricFamily {
    /// Every family, in a fixed order
    pub const ALL: [MetricFamily; 4] = [
        MetricFamily::Glucose,
        MetricFamily::Hba1c,
        MetricFamily::Exercise,
        MetricFamily::Meal,
    ];

    /// Storage and URL name of the family
    pub fn as_str(self) -> &'static str {
        match self {
            MetricFamily::Glucose => "glucose",
            MetricFamily::Hba1c => "hba1c",
            MetricFamily::Exercise => "exercise",
            MetricFamily::Meal => "meal",
        }
    }
}

impl fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricFamily::ALL
            .into_iter()
            .find(|family| family.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown metric family: {}", s))
    }
}

/// Measurement unit of a reading value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum Unit {
    #[serde(rename = "mg/dL")]
    MgDl,
    #[serde(rename = "mmol/L")]
    MmolL,
    #[serde(rename = "percent")]
    Percent,
    #[serde(rename = "minutes")]
    Minutes,
    #[serde(rename = "kcal")]
    Kcal,
}

impl Unit {
    const ALL: [Unit; 5] = [Unit::MgDl, Unit::MmolL, Unit::Percent, Unit::Minutes, Unit::Kcal];

    /// Label used on the wire and in storage
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::MgDl => "mg/dL",
            Unit::MmolL => "mmol/L",
            Unit::Percent => "percent",
            Unit::Minutes => "minutes",
            Unit::Kcal => "kcal",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "%" {
            return Ok(Unit::Percent);
        }
        Unit::ALL
            .into_iter()
            .find(|unit| unit.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown unit: {}", s))
    }
}

/// One line of an itemized meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MealItem {
    /// Food name
    #[validate(length(min = 1, max = 200, message = "Meal item name must be between 1 and 200 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Calories cannot be negative"))]
    pub calories: f64,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Carbs cannot be negative"))]
    pub carbs: f64,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Sugar cannot be negative"))]
    pub sugar: f64,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Protein cannot be negative"))]
    pub protein: f64,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Fat cannot be negative"))]
    pub fat: f64,
}

/// Glucose measured around an exercise session, plus session details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ExerciseDetails {
    /// Glucose right before the session
    #[validate(range(min = 0.0, message = "Glucose before exercise cannot be negative"))]
    pub value_before: Option<f64>,

    /// Glucose right after the session
    #[validate(range(min = 0.0, message = "Glucose after exercise cannot be negative"))]
    pub value_after: Option<f64>,

    /// Unit of the before/after pair
    #[serde(default = "default_glucose_unit")]
    pub glucose_unit: Unit,

    #[validate(range(max = 1440, message = "Duration cannot exceed a day"))]
    pub duration_minutes: Option<u32>,

    #[validate(range(min = 0.0, message = "Calories burned cannot be negative"))]
    pub calories_burned: Option<f64>,
}

fn default_glucose_unit() -> Unit {
    Unit::MgDl
}

/// A recorded health event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Reading {
    /// Unique identifier for the reading
    pub id: String,

    /// Owner of the reading
    pub user_id: String,

    pub metric_family: MetricFamily,

    /// Value as entered, in `unit`
    pub value: f64,

    pub unit: Unit,

    /// When the event happened
    pub occurred_at: DateTime<Utc>,

    /// Glucose reading type, exercise type or meal type
    pub category: Option<String>,

    /// Exercise-only details
    pub exercise: Option<ExerciseDetails>,

    /// Meal-only itemized composition
    pub meal_items: Vec<MealItem>,

    /// Optional notes about the reading
    pub notes: Option<String>,

    /// When the reading was stored
    pub created_at: DateTime<Utc>,
}

/// Request payload for recording a new reading
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateReadingRequest {
    #[validate(length(min = 1, max = 128, message = "User id must be between 1 and 128 characters"))]
    pub user_id: String,

    pub metric_family: MetricFamily,

    #[validate(range(min = 0.0, message = "Value cannot be negative"))]
    pub value: f64,

    pub unit: Unit,

    /// RFC 3339 timestamp of the event. Defaults to the current time if not provided.
    pub occurred_at: Option<String>,

    #[validate(length(min = 1, max = 64, message = "Category must be between 1 and 64 characters"))]
    pub category: Option<String>,

    #[validate]
    pub exercise: Option<ExerciseDetails>,

    #[serde(default)]
    #[validate]
    pub meal_items: Vec<MealItem>,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
}

/// A reading with its value converted to the family's canonical unit
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedReading {
    pub reading_id: String,
    pub user_id: String,
    pub metric_family: MetricFamily,

    /// Value as entered
    pub raw_value: f64,

    /// Unit as entered
    pub unit: Unit,

    /// Value in the canonical unit
    pub value: f64,

    pub occurred_at: DateTime<Utc>,
    pub category: Option<String>,

    /// Exercise pair in mg/dL
    pub glucose_before: Option<f64>,
    pub glucose_after: Option<f64>,

    /// Exercise pair as entered, in `glucose_unit`
    pub raw_glucose_before: Option<f64>,
    pub raw_glucose_after: Option<f64>,
    pub glucose_unit: Option<Unit>,

    pub meal_items: Vec<MealItem>,
}

impl NormalizedReading {
    /// Glucose change across an exercise session, when both halves of the pair exist
    pub fn glucose_change(&self) -> Option<f64> {
        match (self.glucose_before, self.glucose_after) {
            (Some(before), Some(after)) => Some(after - before),
            _ => None,
        }
    }

    /// Summed sugar over the meal items
    pub fn total_sugar(&self) -> f64 {
        self.meal_items.iter().map(|item| item.sugar).sum()
    }

    /// Summed protein over the meal items
    pub fn total_protein(&self) -> f64 {
        self.meal_items.iter().map(|item| item.protein).sum()
    }
}

/// Result of recording a reading: the committed reading and whatever advisories it produced
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RecordedReading {
    pub reading: Reading,
    pub advisories_created: Vec<crate::entities::advisory::Advisory>,
}
