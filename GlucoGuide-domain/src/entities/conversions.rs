use chrono::{DateTime, Utc};
use uuid::Uuid;

use gluco_guide_data::models::{
    format_timestamp, AdvisoryRecord, CreateAdvisoryRecord, CreateReadingRecord, ReadingRecord,
    TargetRangeRecord,
};

use crate::entities::advisory::{Advisory, AdvisoryDraft};
use crate::entities::reading::{CreateReadingRequest, ExerciseDetails, MealItem, MetricFamily, Reading, Unit};
use crate::entities::target_range::TargetRange;

/// Conversion functions between domain entities and data models.
/// Names follow convert_to_[target_layer]_[model_name].

/// Parse a string ID into a UUID, with a descriptive message on failure
pub fn parse_string_to_uuid(id: &str) -> Result<Uuid, String> {
    Uuid::parse_str(id).map_err(|_| format!("Invalid UUID format: {}", id))
}

/// Parse an RFC 3339 timestamp with any offset into UTC
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| format!("Invalid timestamp '{}': {}", value, e))
}

/// Convert a validated request into the row to insert
pub fn convert_to_data_create_reading(
    request: &CreateReadingRequest,
    occurred_at: DateTime<Utc>,
) -> Result<CreateReadingRecord, String> {
    let meal_items = if request.meal_items.is_empty() {
        None
    } else {
        Some(serde_json::to_value(&request.meal_items).map_err(|e| format!("Cannot encode meal items: {}", e))?)
    };
    let exercise = request.exercise.as_ref();

    Ok(CreateReadingRecord {
        user_id: request.user_id.clone(),
        metric_family: request.metric_family.as_str().to_string(),
        value: request.value,
        unit: request.unit.as_str().to_string(),
        occurred_at: format_timestamp(occurred_at),
        category: request.category.clone(),
        value_before: exercise.and_then(|e| e.value_before),
        value_after: exercise.and_then(|e| e.value_after),
        pair_unit: exercise.map(|e| e.glucose_unit.as_str().to_string()),
        duration_minutes: exercise.and_then(|e| e.duration_minutes),
        calories_burned: exercise.and_then(|e| e.calories_burned),
        meal_items,
        notes: request.notes.clone(),
    })
}

/// Convert a stored row into a domain reading
pub fn convert_to_domain_reading(record: ReadingRecord) -> Result<Reading, String> {
    let metric_family: MetricFamily = record.metric_family.parse()?;

    let exercise = if metric_family == MetricFamily::Exercise {
        let glucose_unit = match record.pair_unit.as_deref() {
            Some(unit) => unit.parse()?,
            None => Unit::MgDl,
        };
        Some(ExerciseDetails {
            value_before: record.value_before,
            value_after: record.value_after,
            glucose_unit,
            duration_minutes: record.duration_minutes,
            calories_burned: record.calories_burned,
        })
    } else {
        None
    };

    let meal_items: Vec<MealItem> = match record.meal_items {
        Some(items) => serde_json::from_value(items).map_err(|e| format!("Corrupt meal items on {}: {}", record.id, e))?,
        None => Vec::new(),
    };

    Ok(Reading {
        metric_family,
        unit: record.unit.parse()?,
        occurred_at: parse_timestamp(&record.occurred_at)?,
        created_at: parse_timestamp(&record.created_at)?,
        id: record.id,
        user_id: record.user_id,
        value: record.value,
        category: record.category,
        exercise,
        meal_items,
        notes: record.notes,
    })
}

/// Convert a rule draft into the row to insert
pub fn convert_to_data_advisory(draft: &AdvisoryDraft) -> CreateAdvisoryRecord {
    CreateAdvisoryRecord {
        user_id: draft.user_id.clone(),
        reading_id: Some(draft.reading_id.clone()),
        category: draft.category.as_str().to_string(),
        priority: draft.priority.as_str().to_string(),
        title: draft.title.clone(),
        description: draft.description.clone(),
        suggested_action: draft.suggested_action.clone(),
        trigger_type: draft.trigger_type.as_str().to_string(),
        trigger_payload: draft.trigger_payload.clone(),
        trigger_time: format_timestamp(draft.trigger_time),
    }
}

/// Convert a stored row into a domain advisory
pub fn convert_to_domain_advisory(record: AdvisoryRecord) -> Result<Advisory, String> {
    Ok(Advisory {
        category: record.category.parse()?,
        priority: record.priority.parse()?,
        trigger_type: record.trigger_type.parse()?,
        trigger_time: parse_timestamp(&record.trigger_time)?,
        created_at: parse_timestamp(&record.created_at)?,
        id: record.id,
        user_id: record.user_id,
        reading_id: record.reading_id,
        title: record.title,
        description: record.description,
        suggested_action: record.suggested_action,
        trigger_payload: record.trigger_payload,
        is_read: record.is_read,
        is_dismissed: record.is_dismissed,
        action_taken: record.action_taken,
    })
}

/// Convert a stored row into a domain target range
pub fn convert_to_domain_target_range(record: TargetRangeRecord) -> Result<TargetRange, String> {
    Ok(TargetRange {
        metric_family: record.metric_family.parse()?,
        min: record.min,
        max: record.max,
        unit: record.unit.parse()?,
        is_default: false,
    })
}

/// Convert a domain target range into the row to upsert
pub fn convert_to_data_target_range(
    user_id: &str,
    range: &TargetRange,
    updated_at: DateTime<Utc>,
) -> TargetRangeRecord {
    TargetRangeRecord {
        user_id: user_id.to_string(),
        metric_family: range.metric_family.as_str().to_string(),
        min: range.min,
        max: range.max,
        unit: range.unit.as_str().to_string(),
        updated_at: format_timestamp(updated_at),
    }
}
