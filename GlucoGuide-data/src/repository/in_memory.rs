use std::sync::{Arc, Mutex};
use std::collections::HashMap;

use crate::models::{AdvisoryFlag, AdvisoryRecord, ReadingRecord, TargetRangeRecord};
use super::errors::RepositoryError;

/// In-memory storage used when the database pool is unavailable.
///
/// Timestamps are compared as strings; callers store them in the canonical
/// UTC RFC 3339 form so lexical order matches chronological order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    readings: Arc<Mutex<HashMap<String, ReadingRecord>>>,
    advisories: Arc<Mutex<HashMap<String, AdvisoryRecord>>>,
    target_ranges: Arc<Mutex<HashMap<(String, String), TargetRangeRecord>>>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a reading in memory
    pub async fn store_reading(&self, reading: &ReadingRecord) -> Result<ReadingRecord, RepositoryError> {
        let mut store = self.readings.lock()?;
        store.insert(reading.id.clone(), reading.clone());
        Ok(reading.clone())
    }

    /// Get a reading by ID
    pub async fn get_reading(&self, id: &str) -> Result<Option<ReadingRecord>, RepositoryError> {
        let store = self.readings.lock()?;
        Ok(store.get(id).cloned())
    }

    /// Readings of one user and family with `start <= occurred_at <= end`, oldest first
    pub async fn readings_in_range(
        &self,
        user_id: &str,
        metric_family: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<ReadingRecord>, RepositoryError> {
        let store = self.readings.lock()?;
        let mut readings: Vec<ReadingRecord> = store.values()
            .filter(|r| r.user_id == user_id && r.metric_family == metric_family)
            .filter(|r| r.occurred_at.as_str() >= start && r.occurred_at.as_str() <= end)
            .cloned()
            .collect();

        readings.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at).then_with(|| a.id.cmp(&b.id)));
        Ok(readings)
    }

    /// Remove a reading, returning whether it existed
    pub async fn delete_reading(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut store = self.readings.lock()?;
        Ok(store.remove(id).is_some())
    }

    /// Store an advisory in memory
    pub async fn store_advisory(&self, advisory: &AdvisoryRecord) -> Result<AdvisoryRecord, RepositoryError> {
        let mut store = self.advisories.lock()?;
        store.insert(advisory.id.clone(), advisory.clone());
        Ok(advisory.clone())
    }

    /// Get an advisory by ID
    pub async fn get_advisory(&self, id: &str) -> Result<Option<AdvisoryRecord>, RepositoryError> {
        let store = self.advisories.lock()?;
        Ok(store.get(id).cloned())
    }

    /// All advisories of a user, newest trigger time first
    pub async fn advisories_for_user(&self, user_id: &str) -> Result<Vec<AdvisoryRecord>, RepositoryError> {
        let store = self.advisories.lock()?;
        let mut advisories: Vec<AdvisoryRecord> = store.values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();

        advisories.sort_by(|a, b| b.trigger_time.cmp(&a.trigger_time).then_with(|| a.id.cmp(&b.id)));
        Ok(advisories)
    }

    /// Set a state flag on an advisory
    pub async fn update_advisory_flag(
        &self,
        id: &str,
        flag: AdvisoryFlag,
    ) -> Result<Option<AdvisoryRecord>, RepositoryError> {
        let mut store = self.advisories.lock()?;
        Ok(store.get_mut(id).map(|advisory| {
            flag.apply(advisory);
            advisory.clone()
        }))
    }

    /// Remove an advisory, returning whether it existed
    pub async fn delete_advisory(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut store = self.advisories.lock()?;
        Ok(store.remove(id).is_some())
    }

    /// Get the stored target range for a user and family
    pub async fn get_target_range(
        &self,
        user_id: &str,
        metric_family: &str,
    ) -> Result<Option<TargetRangeRecord>, RepositoryError> {
        let store = self.target_ranges.lock()?;
        Ok(store.get(&(user_id.to_string(), metric_family.to_string())).cloned())
    }

    /// Insert or replace a target range
    pub async fn upsert_target_range(&self, range: &TargetRangeRecord) -> Result<TargetRangeRecord, RepositoryError> {
        let mut store = self.target_ranges.lock()?;
        store.insert((range.user_id.clone(), range.metric_family.clone()), range.clone());
        Ok(range.clone())
    }
}
