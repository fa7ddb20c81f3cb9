use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Topic an advisory belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryCategory {
    Food,
    Exercise,
    Medication,
    General,
    Alert,
}

impl AdvisoryCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            AdvisoryCategory::Food => "food",
            AdvisoryCategory::Exercise => "exercise",
            AdvisoryCategory::Medication => "medication",
            AdvisoryCategory::General => "general",
            AdvisoryCategory::Alert => "alert",
        }
    }
}

impl FromStr for AdvisoryCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "food" => Ok(AdvisoryCategory::Food),
            "exercise" => Ok(AdvisoryCategory::Exercise),
            "medication" => Ok(AdvisoryCategory::Medication),
            "general" => Ok(AdvisoryCategory::General),
            "alert" => Ok(AdvisoryCategory::Alert),
            other => Err(format!("Unknown advisory category: {}", other)),
        }
    }
}

/// Urgency of an advisory. Ordering follows urgency, so `Urgent` is the greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl AdvisoryPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            AdvisoryPriority::Low => "low",
            AdvisoryPriority::Medium => "medium",
            AdvisoryPriority::High => "high",
            AdvisoryPriority::Urgent => "urgent",
        }
    }
}

impl FromStr for AdvisoryPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(AdvisoryPriority::Low),
            "medium" => Ok(AdvisoryPriority::Medium),
            "high" => Ok(AdvisoryPriority::High),
            "urgent" => Ok(AdvisoryPriority::Urgent),
            other => Err(format!("Unknown advisory priority: {}", other)),
        }
    }
}

/// Name of the rule that produced an advisory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    BloodSugarLow,
    BloodSugarHigh,
    ExerciseReminder,
    MealSugarHigh,
    MealProteinLow,
    Hba1cHigh,
}

impl TriggerType {
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerType::BloodSugarLow => "blood_sugar_low",
            TriggerType::BloodSugarHigh => "blood_sugar_high",
            TriggerType::ExerciseReminder => "exercise_reminder",
            TriggerType::MealSugarHigh => "meal_sugar_high",
            TriggerType::MealProteinLow => "meal_protein_low",
            TriggerType::Hba1cHigh => "hba1c_high",
        }
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blood_sugar_low" => Ok(TriggerType::BloodSugarLow),
            "blood_sugar_high" => Ok(TriggerType::BloodSugarHigh),
            "exercise_reminder" => Ok(TriggerType::ExerciseReminder),
            "meal_sugar_high" => Ok(TriggerType::MealSugarHigh),
            "meal_protein_low" => Ok(TriggerType::MealProteinLow),
            "hba1c_high" => Ok(TriggerType::Hba1cHigh),
            other => Err(format!("Unknown trigger type: {}", other)),
        }
    }
}

/// Rule output, not yet persisted
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisoryDraft {
    pub user_id: String,
    pub reading_id: String,
    pub category: AdvisoryCategory,
    pub priority: AdvisoryPriority,
    pub title: String,
    pub description: String,
    pub suggested_action: String,
    pub trigger_type: TriggerType,

    /// Snapshot of the inputs the rule looked at
    pub trigger_payload: serde_json::Value,

    /// When the triggering event happened
    pub trigger_time: DateTime<Utc>,
}

/// A persisted advisory with its client-driven state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Advisory {
    pub id: String,
    pub user_id: String,
    pub reading_id: Option<String>,
    pub category: AdvisoryCategory,
    pub priority: AdvisoryPriority,
    pub title: String,
    pub description: String,
    pub suggested_action: String,
    pub trigger_type: TriggerType,
    pub trigger_payload: serde_json::Value,
    pub trigger_time: DateTime<Utc>,
    pub is_read: bool,
    pub is_dismissed: bool,
    pub action_taken: bool,
    pub created_at: DateTime<Utc>,
}

/// Which advisories a listing returns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvisoryFilter {
    /// Only advisories not yet marked read
    pub unread_only: bool,

    /// Keep dismissed advisories in the listing
    pub include_dismissed: bool,
}

impl AdvisoryFilter {
    pub fn matches(&self, advisory: &Advisory) -> bool {
        (!self.unread_only || !advisory.is_read) && (self.include_dismissed || !advisory.is_dismissed)
    }
}
