use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::reading::{MetricFamily, Unit};

/// A user's acceptable band for one metric family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct TargetRange {
    pub metric_family: MetricFamily,
    pub min: f64,
    pub max: f64,
    pub unit: Unit,

    /// True when the user never configured this range
    #[serde(default)]
    pub is_default: bool,
}

impl TargetRange {
    /// Built-in range for a family; glucose bounds come from configuration
    pub fn default_for(family: MetricFamily, glucose_min: f64, glucose_max: f64) -> Self {
        let (min, max, unit) = match family {
            MetricFamily::Glucose => (glucose_min, glucose_max, Unit::MgDl),
            MetricFamily::Hba1c => (4.0, 7.0, Unit::Percent),
            MetricFamily::Exercise => (30.0, 60.0, Unit::Minutes),
            MetricFamily::Meal => (300.0, 800.0, Unit::Kcal),
        };
        Self {
            metric_family: family,
            min,
            max,
            unit,
            is_default: true,
        }
    }
}

/// Request payload for configuring a target range
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct SetTargetRangeRequest {
    #[validate(range(min = 0.0, message = "Minimum cannot be negative"))]
    pub min: f64,

    #[validate(range(min = 0.0, message = "Maximum cannot be negative"))]
    pub max: f64,

    pub unit: Unit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_per_family() {
        let glucose = TargetRange::default_for(MetricFamily::Glucose, 70.0, 180.0);
        assert_eq!((glucose.min, glucose.max, glucose.unit), (70.0, 180.0, Unit::MgDl));
        assert!(glucose.is_default);

        let hba1c = TargetRange::default_for(MetricFamily::Hba1c, 70.0, 180.0);
        assert_eq!((hba1c.min, hba1c.max, hba1c.unit), (4.0, 7.0, Unit::Percent));
    }

    #[test]
    fn test_negative_bound_is_rejected() {
        let request = SetTargetRangeRequest { min: -1.0, max: 10.0, unit: Unit::MmolL };
        assert!(request.validate().is_err());
    }
}
