//! Unit normalization
//!
//! Every statistic and rule sees values in one canonical unit per metric
//! family: mg/dL for glucose, percent for HbA1c, minutes for exercise and
//! kcal for meals. A unit that does not belong to the family is an error,
//! never coerced.

use thiserror::Error;

use crate::entities::{MetricFamily, NormalizedReading, Reading, TargetRange, Unit};

/// mg/dL per mmol/L of glucose
pub const MMOL_TO_MGDL: f64 = 18.0;

/// Normalization errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NormalizationError {
    /// The unit is not valid for the reading's family
    #[error("Unit {unit} is not valid for {family} readings")]
    UnitMismatch { family: MetricFamily, unit: Unit },
}

/// Canonical unit of a family
pub fn canonical_unit(family: MetricFamily) -> Unit {
    match family {
        MetricFamily::Glucose => Unit::MgDl,
        MetricFamily::Hba1c => Unit::Percent,
        MetricFamily::Exercise => Unit::Minutes,
        MetricFamily::Meal => Unit::Kcal,
    }
}

/// Whether `unit` may be used for values of `family`
pub fn accepts_unit(family: MetricFamily, unit: Unit) -> bool {
    matches!(
        (family, unit),
        (MetricFamily::Glucose, Unit::MgDl)
            | (MetricFamily::Glucose, Unit::MmolL)
            | (MetricFamily::Hba1c, Unit::Percent)
            | (MetricFamily::Exercise, Unit::Minutes)
            | (MetricFamily::Meal, Unit::Kcal)
    )
}

/// Convert one value of `family` from `unit` to the canonical unit
pub fn normalize_value(family: MetricFamily, value: f64, unit: Unit) -> Result<f64, NormalizationError> {
    if !accepts_unit(family, unit) {
        return Err(NormalizationError::UnitMismatch { family, unit });
    }
    let canonical = match unit {
        Unit::MmolL => value * MMOL_TO_MGDL,
        _ => value,
    };
    // -0.0 becomes 0.0
    Ok(canonical + 0.0)
}

/// Normalize a reading, including the glucose pair of an exercise session
pub fn normalize(reading: &Reading) -> Result<NormalizedReading, NormalizationError> {
    let value = normalize_value(reading.metric_family, reading.value, reading.unit)?;

    let pair = reading
        .exercise
        .as_ref()
        .filter(|_| reading.metric_family == MetricFamily::Exercise);

    let (glucose_before, glucose_after) = match pair {
        Some(exercise) => {
            let convert = |v: Option<f64>| {
                v.map(|v| normalize_value(MetricFamily::Glucose, v, exercise.glucose_unit))
                    .transpose()
            };
            (convert(exercise.value_before)?, convert(exercise.value_after)?)
        }
        None => (None, None),
    };

    Ok(NormalizedReading {
        reading_id: reading.id.clone(),
        user_id: reading.user_id.clone(),
        metric_family: reading.metric_family,
        raw_value: reading.value,
        unit: reading.unit,
        value,
        occurred_at: reading.occurred_at,
        category: reading.category.clone(),
        glucose_before,
        glucose_after,
        raw_glucose_before: pair.and_then(|exercise| exercise.value_before),
        raw_glucose_after: pair.and_then(|exercise| exercise.value_after),
        glucose_unit: pair.map(|exercise| exercise.glucose_unit),
        meal_items: reading.meal_items.clone(),
    })
}

/// Express a target range in its family's canonical unit
pub fn normalize_range(range: &TargetRange) -> Result<TargetRange, NormalizationError> {
    let family = range.metric_family;
    Ok(TargetRange {
        metric_family: family,
        min: normalize_value(family, range.min, range.unit)?,
        max: normalize_value(family, range.max, range.unit)?,
        unit: canonical_unit(family),
        is_default: range.is_default,
    })
}
