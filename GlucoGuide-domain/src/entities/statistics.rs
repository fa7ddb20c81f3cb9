use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::reading::{MetricFamily, Unit};
use super::target_range::TargetRange;

/// Look-back period for a statistics request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum StatisticsPeriod {
    #[serde(rename = "24hours")]
    Day,
    #[serde(rename = "7days")]
    Week,
    #[serde(rename = "30days")]
    Month,
    #[serde(rename = "90days")]
    Quarter,
}

impl StatisticsPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            StatisticsPeriod::Day => "24hours",
            StatisticsPeriod::Week => "7days",
            StatisticsPeriod::Month => "30days",
            StatisticsPeriod::Quarter => "90days",
        }
    }

    pub fn duration(self) -> Duration {
        match self {
            StatisticsPeriod::Day => Duration::hours(24),
            StatisticsPeriod::Week => Duration::days(7),
            StatisticsPeriod::Month => Duration::days(30),
            StatisticsPeriod::Quarter => Duration::days(90),
        }
    }

    /// Window `[now - period, now]`
    pub fn window_ending(self, now: DateTime<Utc>) -> TimeWindow {
        TimeWindow {
            start: now - self.duration(),
            end: now,
        }
    }
}

impl FromStr for StatisticsPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "24hours" => Ok(StatisticsPeriod::Day),
            "7days" => Ok(StatisticsPeriod::Week),
            "30days" => Ok(StatisticsPeriod::Month),
            "90days" => Ok(StatisticsPeriod::Quarter),
            other => Err(format!(
                "Unknown period '{}', expected one of 24hours, 7days, 30days, 90days",
                other
            )),
        }
    }
}

/// Closed time interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Count, sum and mean of one group
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct GroupStats {
    pub count: usize,
    pub sum: f64,
    pub average: f64,
}

/// Summary statistics over one window of normalized readings. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct StatisticsSnapshot {
    pub metric_family: MetricFamily,

    /// Canonical unit of every value in the snapshot
    pub unit: Unit,

    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,

    pub count: usize,
    pub average: f64,
    pub min: f64,
    pub max: f64,

    pub in_range: usize,
    pub below_range: usize,
    pub above_range: usize,

    /// Range the counts were computed against, in the canonical unit
    pub target_range: TargetRange,

    /// Keyed by reading type, exercise type or meal type
    pub by_category: BTreeMap<String, GroupStats>,

    /// Keyed by UTC calendar date (YYYY-MM-DD)
    pub by_day: BTreeMap<String, GroupStats>,
}
