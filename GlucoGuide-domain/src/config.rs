//! Analytics configuration
//!
//! Rule thresholds and the default glucose target are configuration inputs,
//! read from the environment with the same defaults as [`AnalyticsConfig::default`].

use gluco_guide_data::database::parse_env_or;

use crate::entities::{MetricFamily, TargetRange};

/// Tunables for the rule evaluator and the default target ranges
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    /// Glucose change across an exercise session, in mg/dL, above which an advisory is emitted
    pub exercise_change_threshold: f64,

    /// Total meal sugar above which a "reduce sugar" advisory is emitted
    pub meal_sugar_limit: f64,

    /// Total meal protein below which an "increase protein" advisory is emitted
    pub meal_protein_minimum: f64,

    /// Default glucose target in mg/dL, used until a user configures their own
    pub default_glucose_min: f64,
    pub default_glucose_max: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            exercise_change_threshold: 30.0,
            meal_sugar_limit: 50.0,
            meal_protein_minimum: 15.0,
            default_glucose_min: 70.0,
            default_glucose_max: 180.0,
        }
    }
}

impl AnalyticsConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            exercise_change_threshold: parse_env_or("RULE_EXERCISE_CHANGE_THRESHOLD", defaults.exercise_change_threshold),
            meal_sugar_limit: parse_env_or("RULE_MEAL_SUGAR_LIMIT", defaults.meal_sugar_limit),
            meal_protein_minimum: parse_env_or("RULE_MEAL_PROTEIN_MINIMUM", defaults.meal_protein_minimum),
            default_glucose_min: parse_env_or("DEFAULT_GLUCOSE_TARGET_MIN", defaults.default_glucose_min),
            default_glucose_max: parse_env_or("DEFAULT_GLUCOSE_TARGET_MAX", defaults.default_glucose_max),
        }
    }

    /// Target range applied when the user has not stored one
    pub fn default_target_range(&self, family: MetricFamily) -> TargetRange {
        TargetRange::default_for(family, self.default_glucose_min, self.default_glucose_max)
    }
}
