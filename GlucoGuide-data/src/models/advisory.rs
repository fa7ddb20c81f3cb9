use serde::{Deserialize, Serialize};

/// Storage model for an emitted advisory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryRecord {
    /// Unique identifier for the advisory
    pub id: String,

    /// Owner of the advisory
    pub user_id: String,

    /// Reading that triggered the advisory, if any
    pub reading_id: Option<String>,

    /// Category label (food, exercise, medication, general, alert)
    pub category: String,

    /// Priority label (low, medium, high, urgent)
    pub priority: String,

    pub title: String,
    pub description: String,
    pub suggested_action: String,

    /// Name of the rule that fired
    pub trigger_type: String,

    /// Snapshot of the inputs that caused emission
    pub trigger_payload: serde_json::Value,

    /// RFC 3339 timestamp of the triggering event
    pub trigger_time: String,

    pub is_read: bool,
    pub is_dismissed: bool,
    pub action_taken: bool,

    /// When the row was written, RFC 3339 in UTC
    pub created_at: String,
}

/// Input data for persisting an advisory draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAdvisoryRecord {
    pub user_id: String,
    pub reading_id: Option<String>,
    pub category: String,
    pub priority: String,
    pub title: String,
    pub description: String,
    pub suggested_action: String,
    pub trigger_type: String,
    pub trigger_payload: serde_json::Value,
    pub trigger_time: String,
}

impl CreateAdvisoryRecord {
    /// Attach an id and creation time. New advisories start unread, undismissed
    /// and without action taken.
    pub fn into_record(self, id: String, created_at: String) -> AdvisoryRecord {
        AdvisoryRecord {
            id,
            user_id: self.user_id,
            reading_id: self.reading_id,
            category: self.category,
            priority: self.priority,
            title: self.title,
            description: self.description,
            suggested_action: self.suggested_action,
            trigger_type: self.trigger_type,
            trigger_payload: self.trigger_payload,
            trigger_time: self.trigger_time,
            is_read: false,
            is_dismissed: false,
            action_taken: false,
            created_at,
        }
    }
}

/// Client-driven state flags on an advisory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisoryFlag {
    Read,
    Dismissed,
    ActionTaken,
}

impl AdvisoryFlag {
    /// Column backing this flag
    pub fn column(self) -> &'static str {
        match self {
            AdvisoryFlag::Read => "is_read",
            AdvisoryFlag::Dismissed => "is_dismissed",
            AdvisoryFlag::ActionTaken => "action_taken",
        }
    }

    /// Set the flag on an in-memory record
    pub fn apply(self, record: &mut AdvisoryRecord) {
        match self {
            AdvisoryFlag::Read => record.is_read = true,
            AdvisoryFlag::Dismissed => record.is_dismissed = true,
            AdvisoryFlag::ActionTaken => record.action_taken = true,
        }
    }
}
