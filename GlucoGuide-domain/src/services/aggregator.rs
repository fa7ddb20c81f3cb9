//! Window aggregation
//!
//! One generic grouping routine drives every breakdown; callers only supply
//! the key extractor. Values are summed in sorted order so the output is the
//! same for any permutation of the input.

use std::collections::BTreeMap;

use crate::entities::{GroupStats, NormalizedReading, StatisticsSnapshot, TargetRange, TimeWindow};
use crate::services::normalizer::canonical_unit;

/// Group items by an extracted key. Items whose key is `None` are left out.
pub fn aggregate_by<T, K, F, V>(items: &[T], key_of: F, value_of: V) -> BTreeMap<K, GroupStats>
where
    K: Ord,
    F: Fn(&T) -> Option<K>,
    V: Fn(&T) -> f64,
{
    let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for item in items {
        if let Some(key) = key_of(item) {
            groups.entry(key).or_default().push(value_of(item));
        }
    }

    groups
        .into_iter()
        .map(|(key, mut values)| (key, group_stats(&mut values)))
        .collect()
}

fn group_stats(values: &mut [f64]) -> GroupStats {
    let count = values.len();
    let sum = ordered_sum(values);
    GroupStats {
        count,
        sum,
        average: if count == 0 { 0.0 } else { sum / count as f64 },
    }
}

fn ordered_sum(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    values.iter().sum()
}

/// Summarize normalized readings against a canonical target range.
///
/// Empty input yields a zero snapshot. A value equal to either bound counts
/// as in range.
pub fn aggregate(readings: &[NormalizedReading], target: &TargetRange, window: TimeWindow) -> StatisticsSnapshot {
    let family = target.metric_family;
    let mut values: Vec<f64> = readings.iter().map(|r| r.value).collect();
    let count = values.len();

    let sum = ordered_sum(&mut values);

    // Sorted by total order, so ties between signed zeros do not depend on input order
    let min = values.first().copied().unwrap_or(0.0);
    let max = values.last().copied().unwrap_or(0.0);

    let below_range = values.iter().filter(|v| **v < target.min).count();
    let above_range = values.iter().filter(|v| **v > target.max && !(**v < target.min)).count();

    let average = if count == 0 { 0.0 } else { sum / count as f64 };

    StatisticsSnapshot {
        metric_family: family,
        unit: canonical_unit(family),
        window_start: window.start,
        window_end: window.end,
        count,
        average,
        min,
        max,
        in_range: count - below_range - above_range,
        below_range,
        above_range,
        target_range: target.clone(),
        by_category: aggregate_by(readings, |r| r.category.clone(), |r| r.value),
        by_day: aggregate_by(
            readings,
            |r| Some(r.occurred_at.date_naive().format("%Y-%m-%d").to_string()),
            |r| r.value,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{MetricFamily, Unit};
    use chrono::{TimeZone, Utc};

    fn glucose_target() -> TargetRange {
        TargetRange {
            metric_family: MetricFamily::Glucose,
            min: 70.0,
            max: 180.0,
            unit: Unit::MgDl,
            is_default: true,
        }
    }

    fn window() -> TimeWindow {
        TimeWindow {
            start: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 3, 8, 0, 0, 0).unwrap(),
        }
    }

    fn glucose(value: f64, day: u32, hour: u32, category: &str) -> NormalizedReading {
        NormalizedReading {
            reading_id: format!("r-{}-{}-{}", value, day, hour),
            user_id: "user-1".to_string(),
            metric_family: MetricFamily::Glucose,
            raw_value: value,
            unit: Unit::MgDl,
            value,
            occurred_at: Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap(),
            category: Some(category.to_string()),
            glucose_before: None,
            glucose_after: None,
            raw_glucose_before: None,
            raw_glucose_after: None,
            glucose_unit: None,
            meal_items: Vec::new(),
        }
    }

    fn sample() -> Vec<NormalizedReading> {
        vec![
            glucose(95.0, 1, 7, "fasting"),
            glucose(65.0, 1, 22, "bedtime"),
            glucose(210.5, 2, 13, "after_meal"),
            glucose(180.0, 2, 7, "fasting"),
            glucose(70.0, 3, 8, "fasting"),
            glucose(0.1, 3, 9, "random"),
            glucose(133.3, 3, 12, "after_meal"),
        ]
    }

    #[test]
    fn test_empty_input_gives_zero_snapshot() {
        let snapshot = aggregate(&[], &glucose_target(), window());
        assert_eq!(snapshot.count, 0);
        assert_eq!(snapshot.average, 0.0);
        assert_eq!((snapshot.min, snapshot.max), (0.0, 0.0));
        assert_eq!(snapshot.in_range + snapshot.below_range + snapshot.above_range, 0);
        assert!(snapshot.by_category.is_empty());
        assert!(snapshot.by_day.is_empty());
    }

    #[test]
    fn test_bounds_are_in_range_and_counts_add_up() {
        let snapshot = aggregate(&sample(), &glucose_target(), window());
        assert_eq!(snapshot.count, 7);
        assert_eq!(snapshot.below_range, 2);
        assert_eq!(snapshot.above_range, 1);
        assert_eq!(snapshot.in_range, 4);
        assert_eq!(snapshot.in_range + snapshot.below_range + snapshot.above_range, snapshot.count);
        assert_eq!((snapshot.min, snapshot.max), (0.1, 210.5));
    }

    #[test]
    fn test_groups_by_category_and_day() {
        let snapshot = aggregate(&sample(), &glucose_target(), window());

        let fasting = snapshot.by_category["fasting"];
        assert_eq!(fasting.count, 3);
        assert_eq!(fasting.sum, 345.0);
        assert_eq!(fasting.average, 115.0);

        let days: Vec<&str> = snapshot.by_day.keys().map(String::as_str).collect();
        assert_eq!(days, vec!["2024-03-01", "2024-03-02", "2024-03-03"]);
        assert_eq!(snapshot.by_day["2024-03-01"].count, 2);
    }

    #[test]
    fn test_order_independent() {
        let forward = sample();
        let mut reversed = sample();
        reversed.reverse();
        let mut rotated = sample();
        rotated.rotate_left(3);

        let expected = aggregate(&forward, &glucose_target(), window());
        assert_eq!(aggregate(&reversed, &glucose_target(), window()), expected);
        assert_eq!(aggregate(&rotated, &glucose_target(), window()), expected);
    }

    #[test]
    fn test_signed_zeros_do_not_depend_on_order() {
        let zeros = vec![glucose(0.0, 1, 7, "random"), glucose(-0.0, 1, 8, "random")];
        let mut swapped = zeros.clone();
        swapped.reverse();

        let forward = aggregate(&zeros, &glucose_target(), window());
        let backward = aggregate(&swapped, &glucose_target(), window());
        assert_eq!(forward.min.to_bits(), backward.min.to_bits());
        assert_eq!(forward.max.to_bits(), backward.max.to_bits());
        assert_eq!(
            serde_json::to_string(&forward).unwrap(),
            serde_json::to_string(&backward).unwrap()
        );
    }

    #[test]
    fn test_aggregate_by_skips_missing_keys() {
        let mut readings = sample();
        readings[0].category = None;
        let groups = aggregate_by(&readings, |r| r.category.clone(), |r| r.value);
        assert_eq!(groups["fasting"].count, 2);
        assert_eq!(groups.values().map(|g| g.count).sum::<usize>(), 6);
    }
}
