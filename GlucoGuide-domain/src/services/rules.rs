//! Advisory rules
//!
//! Each rule is a pure function of one normalized event, the user's target
//! range in canonical units and the configured thresholds. Every matching rule
//! fires; nothing short-circuits and nothing is deduplicated across time.

use serde_json::{json, Value};

use crate::config::AnalyticsConfig;
use crate::entities::{
    AdvisoryCategory, AdvisoryDraft, AdvisoryPriority, MetricFamily, NormalizedReading, TargetRange, TriggerType,
};

/// Signature shared by every rule
pub type Rule = fn(&NormalizedReading, &TargetRange, &AnalyticsConfig) -> Option<AdvisoryDraft>;

/// All rules, evaluated in this order before sorting by priority
pub const RULES: &[Rule] = &[
    glucose_low,
    glucose_high,
    exercise_large_drop,
    exercise_large_rise,
    exercise_moderate_drop,
    meal_sugar_high,
    meal_protein_low,
    hba1c_high,
];

/// Evaluate every rule against one event, most urgent draft first
pub fn evaluate(event: &NormalizedReading, target: &TargetRange, config: &AnalyticsConfig) -> Vec<AdvisoryDraft> {
    let mut drafts: Vec<AdvisoryDraft> = RULES
        .iter()
        .filter_map(|rule| rule(event, target, config))
        .collect();
    drafts.sort_by(|a, b| b.priority.cmp(&a.priority));
    drafts
}

struct DraftText<'a> {
    category: AdvisoryCategory,
    priority: AdvisoryPriority,
    trigger_type: TriggerType,
    title: &'a str,
    description: String,
    suggested_action: &'a str,
}

fn draft(event: &NormalizedReading, text: DraftText<'_>, threshold: f64, extra: Value) -> AdvisoryDraft {
    let mut payload = json!({
        "reading_id": event.reading_id,
        "metric_family": event.metric_family.as_str(),
        "raw_value": event.raw_value,
        "unit": event.unit.as_str(),
        "normalized_value": event.value,
        "threshold": threshold,
    });
    if let (Value::Object(payload), Value::Object(extra)) = (&mut payload, extra) {
        payload.extend(extra);
    }

    AdvisoryDraft {
        user_id: event.user_id.clone(),
        reading_id: event.reading_id.clone(),
        category: text.category,
        priority: text.priority,
        title: text.title.to_string(),
        description: text.description,
        suggested_action: text.suggested_action.to_string(),
        trigger_type: text.trigger_type,
        trigger_payload: payload,
        trigger_time: event.occurred_at,
    }
}

pub fn glucose_low(event: &NormalizedReading, target: &TargetRange, _config: &AnalyticsConfig) -> Option<AdvisoryDraft> {
    if event.metric_family != MetricFamily::Glucose || !(event.value < target.min) {
        return None;
    }
    Some(draft(
        event,
        DraftText {
            category: AdvisoryCategory::Alert,
            priority: AdvisoryPriority::High,
            trigger_type: TriggerType::BloodSugarLow,
            title: "Low blood sugar",
            description: format!(
                "Your blood sugar of {:.0} mg/dL is below your target minimum of {:.0} mg/dL.",
                event.value, target.min
            ),
            suggested_action: "Take 15g of fast-acting carbohydrates such as juice or glucose tablets, then re-check in 15 minutes.",
        },
        target.min,
        json!({}),
    ))
}

/// Never fires together with [`glucose_low`]; a malformed range where both match counts as low.
pub fn glucose_high(event: &NormalizedReading, target: &TargetRange, _config: &AnalyticsConfig) -> Option<AdvisoryDraft> {
    if event.metric_family != MetricFamily::Glucose || !(event.value > target.max) || event.value < target.min {
        return None;
    }
    Some(draft(
        event,
        DraftText {
            category: AdvisoryCategory::General,
            priority: AdvisoryPriority::Medium,
            trigger_type: TriggerType::BloodSugarHigh,
            title: "High blood sugar",
            description: format!(
                "Your blood sugar of {:.0} mg/dL is above your target maximum of {:.0} mg/dL.",
                event.value, target.max
            ),
            suggested_action: "Drink water, take a short walk if you feel well, and re-check in 1-2 hours.",
        },
        target.max,
        json!({}),
    ))
}

fn exercise_payload(event: &NormalizedReading, change: f64) -> Value {
    json!({
        "value_before": event.glucose_before,
        "value_after": event.glucose_after,
        "raw_value_before": event.raw_glucose_before,
        "raw_value_after": event.raw_glucose_after,
        "pair_unit": event.glucose_unit.map(|unit| unit.as_str()),
        "change": change,
    })
}

fn exercise_change(event: &NormalizedReading) -> Option<f64> {
    if event.metric_family != MetricFamily::Exercise {
        return None;
    }
    event.glucose_change()
}

pub fn exercise_large_drop(event: &NormalizedReading, _target: &TargetRange, config: &AnalyticsConfig) -> Option<AdvisoryDraft> {
    let threshold = config.exercise_change_threshold;
    let change = exercise_change(event).filter(|change| *change < -threshold)?;
    Some(draft(
        event,
        DraftText {
            category: AdvisoryCategory::Exercise,
            priority: AdvisoryPriority::Medium,
            trigger_type: TriggerType::ExerciseReminder,
            title: "Large drop during exercise",
            description: format!("Your blood sugar dropped by {:.0} mg/dL during exercise.", change.abs()),
            suggested_action: "Have a small carbohydrate snack before your next session.",
        },
        threshold,
        exercise_payload(event, change),
    ))
}

pub fn exercise_large_rise(event: &NormalizedReading, _target: &TargetRange, config: &AnalyticsConfig) -> Option<AdvisoryDraft> {
    let threshold = config.exercise_change_threshold;
    let change = exercise_change(event).filter(|change| *change > threshold)?;
    Some(draft(
        event,
        DraftText {
            category: AdvisoryCategory::Exercise,
            priority: AdvisoryPriority::Low,
            trigger_type: TriggerType::ExerciseReminder,
            title: "Blood sugar rose during exercise",
            description: format!("Your blood sugar rose by {:.0} mg/dL during exercise.", change),
            suggested_action: "Try a lower intensity next time; intense exercise can raise blood sugar.",
        },
        threshold,
        exercise_payload(event, change),
    ))
}

pub fn exercise_moderate_drop(event: &NormalizedReading, _target: &TargetRange, config: &AnalyticsConfig) -> Option<AdvisoryDraft> {
    let threshold = config.exercise_change_threshold;
    let change = exercise_change(event).filter(|change| *change >= -threshold && *change < 0.0)?;
    Some(draft(
        event,
        DraftText {
            category: AdvisoryCategory::Exercise,
            priority: AdvisoryPriority::Low,
            trigger_type: TriggerType::ExerciseReminder,
            title: "Exercise is working",
            description: format!("Your blood sugar dropped by {:.0} mg/dL during exercise.", change.abs()),
            suggested_action: "Keep up the regular activity.",
        },
        threshold,
        exercise_payload(event, change),
    ))
}

fn meal_payload(event: &NormalizedReading) -> Value {
    json!({
        "meal_id": event.reading_id,
        "total_sugar": event.total_sugar(),
        "total_protein": event.total_protein(),
        "item_count": event.meal_items.len(),
    })
}

pub fn meal_sugar_high(event: &NormalizedReading, _target: &TargetRange, config: &AnalyticsConfig) -> Option<AdvisoryDraft> {
    let limit = config.meal_sugar_limit;
    if event.metric_family != MetricFamily::Meal || !(event.total_sugar() > limit) {
        return None;
    }
    Some(draft(
        event,
        DraftText {
            category: AdvisoryCategory::Food,
            priority: AdvisoryPriority::High,
            trigger_type: TriggerType::MealSugarHigh,
            title: "High sugar meal",
            description: format!("This meal contained {:.0}g of sugar, above the limit of {:.0}g.", event.total_sugar(), limit),
            suggested_action: "Reduce sugar: swap sweet items for whole foods or smaller portions.",
        },
        limit,
        meal_payload(event),
    ))
}

pub fn meal_protein_low(event: &NormalizedReading, _target: &TargetRange, config: &AnalyticsConfig) -> Option<AdvisoryDraft> {
    let minimum = config.meal_protein_minimum;
    if event.metric_family != MetricFamily::Meal || event.meal_items.len() <= 1 || !(event.total_protein() < minimum) {
        return None;
    }
    Some(draft(
        event,
        DraftText {
            category: AdvisoryCategory::Food,
            priority: AdvisoryPriority::Medium,
            trigger_type: TriggerType::MealProteinLow,
            title: "Low protein meal",
            description: format!("This meal contained {:.0}g of protein, below the minimum of {:.0}g.", event.total_protein(), minimum),
            suggested_action: "Increase protein: add eggs, fish, beans or yoghurt to slow glucose absorption.",
        },
        minimum,
        meal_payload(event),
    ))
}

pub fn hba1c_high(event: &NormalizedReading, target: &TargetRange, _config: &AnalyticsConfig) -> Option<AdvisoryDraft> {
    if event.metric_family != MetricFamily::Hba1c || !(event.value > target.max) {
        return None;
    }
    Some(draft(
        event,
        DraftText {
            category: AdvisoryCategory::Medication,
            priority: AdvisoryPriority::Medium,
            trigger_type: TriggerType::Hba1cHigh,
            title: "HbA1c above target",
            description: format!("Your HbA1c of {:.1}% is above your target of {:.1}%.", event.value, target.max),
            suggested_action: "Review your treatment plan with your clinician.",
        },
        target.max,
        json!({}),
    ))
}
