use chrono::Utc;
use tracing::debug;
use uuid::Uuid;
use async_trait::async_trait;

use crate::models::{format_timestamp, CreateReadingRecord, ReadingRecord};
use crate::database::get_db_pool;
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;

/// Reading Store: durable records of health events per user
#[async_trait]
pub trait ReadingRepositoryTrait {
    /// Persist a new reading
    async fn create(&self, request: CreateReadingRecord) -> Result<ReadingRecord, RepositoryError>;

    /// Get a reading by ID
    async fn get_by_id(&self, id: Uuid) -> Result<Option<ReadingRecord>, RepositoryError>;

    /// Readings of one user and family with `start <= occurred_at <= end`, oldest first
    async fn find_in_range(
        &self,
        user_id: &str,
        metric_family: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<ReadingRecord>, RepositoryError>;

    /// Delete a reading, returning whether it existed
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}

/// Reading repository backed by SQLite, with in-memory storage while the pool is not initialized
#[derive(Debug, Clone, Default)]
pub struct ReadingRepository {
    storage: InMemoryStorage,
}

impl ReadingRepository {
    /// Create a new repository
    pub fn new() -> Self {
        Self {
            storage: InMemoryStorage::new(),
        }
    }
}

#[async_trait]
impl ReadingRepositoryTrait for ReadingRepository {
    async fn create(&self, request: CreateReadingRecord) -> Result<ReadingRecord, RepositoryError> {
        let reading = request.into_record(Uuid::new_v4().to_string(), format_timestamp(Utc::now()));

        match get_db_pool() {
            Ok(pool) => {
                debug!("Storing reading in database: {}", reading.id);
                DatabaseStorage::store_reading(&pool, &reading).await?;
                Ok(reading)
            },
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage", e);
                self.storage.store_reading(&reading).await
            }
        }
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<ReadingRecord>, RepositoryError> {
        let id = id.to_string();
        match get_db_pool() {
            Ok(pool) => DatabaseStorage::get_reading(&pool, &id).await,
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage for get_by_id", e);
                self.storage.get_reading(&id).await
            }
        }
    }

    async fn find_in_range(
        &self,
        user_id: &str,
        metric_family: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<ReadingRecord>, RepositoryError> {
        match get_db_pool() {
            Ok(pool) => DatabaseStorage::readings_in_range(&pool, user_id, metric_family, start, end).await,
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage for find_in_range", e);
                self.storage.readings_in_range(user_id, metric_family, start, end).await
            }
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let id = id.to_string();
        match get_db_pool() {
            Ok(pool) => DatabaseStorage::delete_reading(&pool, &id).await,
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage for delete", e);
                self.storage.delete_reading(&id).await
            }
        }
    }
}

/// Mock reading repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Vec-backed reading repository with switchable failures
    #[derive(Debug, Default)]
    pub struct MockReadingRepository {
        readings: Mutex<Vec<ReadingRecord>>,
        fail_writes: bool,
        fail_reads: bool,
    }

    impl MockReadingRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository with predefined readings
        pub fn with_readings(readings: Vec<ReadingRecord>) -> Self {
            Self {
                readings: Mutex::new(readings),
                ..Self::default()
            }
        }

        /// Fail every create call
        pub fn failing_writes(mut self) -> Self {
            self.fail_writes = true;
            self
        }

        /// Fail every read call
        pub fn failing_reads(mut self) -> Self {
            self.fail_reads = true;
            self
        }

        /// Snapshot of everything stored so far
        pub fn stored(&self) -> Vec<ReadingRecord> {
            self.readings.lock().map(|r| r.clone()).unwrap_or_default()
        }

        fn check_reads(&self) -> Result<(), RepositoryError> {
            if self.fail_reads {
                return Err(RepositoryError::Unavailable("mock reading store is configured to fail reads".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ReadingRepositoryTrait for MockReadingRepository {
        async fn create(&self, request: CreateReadingRecord) -> Result<ReadingRecord, RepositoryError> {
            if self.fail_writes {
                return Err(RepositoryError::Unavailable("mock reading store is configured to fail writes".to_string()));
            }
            let reading = request.into_record(Uuid::new_v4().to_string(), format_timestamp(Utc::now()));
            self.readings.lock()?.push(reading.clone());
            Ok(reading)
        }

        async fn get_by_id(&self, id: Uuid) -> Result<Option<ReadingRecord>, RepositoryError> {
            self.check_reads()?;
            let id = id.to_string();
            Ok(self.readings.lock()?.iter().find(|r| r.id == id).cloned())
        }

        async fn find_in_range(
            &self,
            user_id: &str,
            metric_family: &str,
            start: &str,
            end: &str,
        ) -> Result<Vec<ReadingRecord>, RepositoryError> {
            self.check_reads()?;
            let mut readings: Vec<ReadingRecord> = self.readings.lock()?
                .iter()
                .filter(|r| r.user_id == user_id && r.metric_family == metric_family)
                .filter(|r| r.occurred_at.as_str() >= start && r.occurred_at.as_str() <= end)
                .cloned()
                .collect();
            readings.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at));
            Ok(readings)
        }

        async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
            let id = id.to_string();
            let mut readings = self.readings.lock()?;
            let before = readings.len();
            readings.retain(|r| r.id != id);
            Ok(readings.len() != before)
        }
    }
}

#[cfg(test)]
mod repository_tests {
    use super::*;

    fn glucose_request(user_id: &str, value: f64, occurred_at: &str) -> CreateReadingRecord {
        CreateReadingRecord {
            user_id: user_id.to_string(),
            metric_family: "glucose".to_string(),
            value,
            unit: "mg/dL".to_string(),
            occurred_at: occurred_at.to_string(),
            category: Some("fasting".to_string()),
            value_before: None,
            value_after: None,
            pair_unit: None,
            duration_minutes: None,
            calories_burned: None,
            meal_items: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_in_memory_fallback_create_and_find() {
        let repo = ReadingRepository::new();

        let created = repo.create(glucose_request("user-1", 110.0, "2024-03-01T08:00:00.000Z")).await.unwrap();
        repo.create(glucose_request("user-2", 95.0, "2024-03-01T09:00:00.000Z")).await.unwrap();

        let found = repo.find_in_range(
            "user-1", "glucose", "2024-03-01T00:00:00.000Z", "2024-03-02T00:00:00.000Z",
        ).await.unwrap();
        assert_eq!(found, vec![created.clone()]);

        let id = Uuid::parse_str(&created.id).unwrap();
        assert!(repo.get_by_id(id).await.unwrap().is_some());
        assert!(repo.delete(id).await.unwrap());
        assert!(repo.get_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let repo = ReadingRepository::new();
        let clone = repo.clone();

        let created = repo.create(glucose_request("user-1", 120.0, "2024-03-01T08:00:00.000Z")).await.unwrap();
        let id = Uuid::parse_str(&created.id).unwrap();

        assert_eq!(clone.get_by_id(id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn test_mock_failing_writes() {
        let repo = tests::MockReadingRepository::new().failing_writes();
        let result = repo.create(glucose_request("user-1", 120.0, "2024-03-01T08:00:00.000Z")).await;
        assert!(matches!(result, Err(RepositoryError::Unavailable(_))));
        assert!(repo.stored().is_empty());
    }
}
