use chrono::Utc;
use tracing::debug;
use uuid::Uuid;
use async_trait::async_trait;

use crate::models::{format_timestamp, AdvisoryFlag, AdvisoryRecord, CreateAdvisoryRecord};
use crate::database::get_db_pool;
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;

/// Advisory Sink: durable store of emitted advisories
#[async_trait]
pub trait AdvisoryRepositoryTrait {
    /// Append a new advisory. Nothing is deduplicated.
    async fn create(&self, request: CreateAdvisoryRecord) -> Result<AdvisoryRecord, RepositoryError>;

    /// Get an advisory by ID
    async fn get_by_id(&self, id: Uuid) -> Result<Option<AdvisoryRecord>, RepositoryError>;

    /// All advisories of a user, newest trigger time first
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<AdvisoryRecord>, RepositoryError>;

    /// Set a read/dismiss/action flag, returning the updated advisory
    async fn set_flag(&self, id: Uuid, flag: AdvisoryFlag) -> Result<Option<AdvisoryRecord>, RepositoryError>;

    /// Delete an advisory, returning whether it existed
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}

/// Advisory repository backed by SQLite, with in-memory storage while the pool is not initialized
#[derive(Debug, Clone, Default)]
pub struct AdvisoryRepository {
    storage: InMemoryStorage,
}

impl AdvisoryRepository {
    /// Create a new repository
    pub fn new() -> Self {
        Self {
            storage: InMemoryStorage::new(),
        }
    }
}

#[async_trait]
impl AdvisoryRepositoryTrait for AdvisoryRepository {
    async fn create(&self, request: CreateAdvisoryRecord) -> Result<AdvisoryRecord, RepositoryError> {
        let advisory = request.into_record(Uuid::new_v4().to_string(), format_timestamp(Utc::now()));

        match get_db_pool() {
            Ok(pool) => {
                DatabaseStorage::store_advisory(&pool, &advisory).await?;
                Ok(advisory)
            },
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage", e);
                self.storage.store_advisory(&advisory).await
            }
        }
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<AdvisoryRecord>, RepositoryError> {
        let id = id.to_string();
        match get_db_pool() {
            Ok(pool) => DatabaseStorage::get_advisory(&pool, &id).await,
            Err(_) => self.storage.get_advisory(&id).await,
        }
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<AdvisoryRecord>, RepositoryError> {
        match get_db_pool() {
            Ok(pool) => DatabaseStorage::advisories_for_user(&pool, user_id).await,
            Err(_) => self.storage.advisories_for_user(user_id).await,
        }
    }

    async fn set_flag(&self, id: Uuid, flag: AdvisoryFlag) -> Result<Option<AdvisoryRecord>, RepositoryError> {
        let id = id.to_string();
        match get_db_pool() {
            Ok(pool) => DatabaseStorage::update_advisory_flag(&pool, &id, flag).await,
            Err(_) => self.storage.update_advisory_flag(&id, flag).await,
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let id = id.to_string();
        match get_db_pool() {
            Ok(pool) => DatabaseStorage::delete_advisory(&pool, &id).await,
            Err(_) => self.storage.delete_advisory(&id).await,
        }
    }
}

/// Mock advisory repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Vec-backed advisory repository; `failing()` makes every call error
    #[derive(Debug, Default)]
    pub struct MockAdvisoryRepository {
        advisories: Mutex<Vec<AdvisoryRecord>>,
        fail: bool,
    }

    impl MockAdvisoryRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Mock whose every operation reports the sink as unavailable
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        /// Snapshot of everything stored so far
        pub fn stored(&self) -> Vec<AdvisoryRecord> {
            self.advisories.lock().map(|a| a.clone()).unwrap_or_default()
        }

        fn check(&self) -> Result<(), RepositoryError> {
            if self.fail {
                return Err(RepositoryError::Unavailable("mock advisory sink is configured to fail".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl AdvisoryRepositoryTrait for MockAdvisoryRepository {
        async fn create(&self, request: CreateAdvisoryRecord) -> Result<AdvisoryRecord, RepositoryError> {
            self.check()?;
            let advisory = request.into_record(Uuid::new_v4().to_string(), format_timestamp(Utc::now()));
            self.advisories.lock()?.push(advisory.clone());
            Ok(advisory)
        }

        async fn get_by_id(&self, id: Uuid) -> Result<Option<AdvisoryRecord>, RepositoryError> {
            self.check()?;
            let id = id.to_string();
            Ok(self.advisories.lock()?.iter().find(|a| a.id == id).cloned())
        }

        async fn list_for_user(&self, user_id: &str) -> Result<Vec<AdvisoryRecord>, RepositoryError> {
            self.check()?;
            let mut advisories: Vec<AdvisoryRecord> = self.advisories.lock()?
                .iter()
                .filter(|a| a.user_id == user_id)
                .cloned()
                .collect();
            advisories.sort_by(|a, b| b.trigger_time.cmp(&a.trigger_time));
            Ok(advisories)
        }

        async fn set_flag(&self, id: Uuid, flag: AdvisoryFlag) -> Result<Option<AdvisoryRecord>, RepositoryError> {
            self.check()?;
            let id = id.to_string();
            let mut advisories = self.advisories.lock()?;
            Ok(advisories.iter_mut().find(|a| a.id == id).map(|advisory| {
                flag.apply(advisory);
                advisory.clone()
            }))
        }

        async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
            self.check()?;
            let id = id.to_string();
            let mut advisories = self.advisories.lock()?;
            let before = advisories.len();
            advisories.retain(|a| a.id != id);
            Ok(advisories.len() != before)
        }
    }
}
