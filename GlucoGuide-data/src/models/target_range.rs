use serde::{Deserialize, Serialize};

/// Storage model for a user's target range on one metric family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRangeRecord {
    pub user_id: String,
    pub metric_family: String,
    pub min: f64,
    pub max: f64,
    pub unit: String,
    pub updated_at: String,
}
