use tracing::debug;
use async_trait::async_trait;

use crate::models::TargetRangeRecord;
use crate::database::get_db_pool;
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;

/// Per-user target ranges, one per metric family
#[async_trait]
pub trait TargetRangeRepositoryTrait {
    /// Stored range for a user and family, if the user configured one
    async fn get(&self, user_id: &str, metric_family: &str) -> Result<Option<TargetRangeRecord>, RepositoryError>;

    /// Insert or replace the range for `range.user_id` and `range.metric_family`
    async fn upsert(&self, range: TargetRangeRecord) -> Result<TargetRangeRecord, RepositoryError>;
}

/// Target range repository backed by SQLite, with in-memory storage while the pool is not initialized
#[derive(Debug, Clone, Default)]
pub struct TargetRangeRepository {
    storage: InMemoryStorage,
}

impl TargetRangeRepository {
    /// Create a new repository
    pub fn new() -> Self {
        Self {
            storage: InMemoryStorage::new(),
        }
    }
}

#[async_trait]
impl TargetRangeRepositoryTrait for TargetRangeRepository {
    async fn get(&self, user_id: &str, metric_family: &str) -> Result<Option<TargetRangeRecord>, RepositoryError> {
        match get_db_pool() {
            Ok(pool) => DatabaseStorage::get_target_range(&pool, user_id, metric_family).await,
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage for target ranges", e);
                self.storage.get_target_range(user_id, metric_family).await
            }
        }
    }

    async fn upsert(&self, range: TargetRangeRecord) -> Result<TargetRangeRecord, RepositoryError> {
        match get_db_pool() {
            Ok(pool) => {
                DatabaseStorage::upsert_target_range(&pool, &range).await?;
                Ok(range)
            },
            Err(_) => self.storage.upsert_target_range(&range).await,
        }
    }
}

/// Mock target range repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Map-backed target range repository; `failing()` makes every call error
    #[derive(Debug, Default)]
    pub struct MockTargetRangeRepository {
        ranges: Mutex<HashMap<(String, String), TargetRangeRecord>>,
        fail: bool,
    }

    impl MockTargetRangeRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Mock preloaded with one range
        pub fn with_range(range: TargetRangeRecord) -> Self {
            let repo = Self::default();
            if let Ok(mut ranges) = repo.ranges.lock() {
                ranges.insert((range.user_id.clone(), range.metric_family.clone()), range);
            }
            repo
        }

        /// Mock whose every operation reports the store as unavailable
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn check(&self) -> Result<(), RepositoryError> {
            if self.fail {
                return Err(RepositoryError::Unavailable("mock target range store is configured to fail".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl TargetRangeRepositoryTrait for MockTargetRangeRepository {
        async fn get(&self, user_id: &str, metric_family: &str) -> Result<Option<TargetRangeRecord>, RepositoryError> {
            self.check()?;
            Ok(self.ranges.lock()?.get(&(user_id.to_string(), metric_family.to_string())).cloned())
        }

        async fn upsert(&self, range: TargetRangeRecord) -> Result<TargetRangeRecord, RepositoryError> {
            self.check()?;
            self.ranges.lock()?.insert((range.user_id.clone(), range.metric_family.clone()), range.clone());
            Ok(range)
        }
    }
}
