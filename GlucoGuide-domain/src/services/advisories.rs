use thiserror::Error;
use tracing::{error, info};
use async_trait::async_trait;

use gluco_guide_data::models::AdvisoryFlag;
use gluco_guide_data::repository::RepositoryError;

use crate::entities::conversions;
use crate::entities::{Advisory, AdvisoryFilter};
use crate::services::SharedAdvisoryRepository;

/// Advisory service errors
#[derive(Debug, Error)]
pub enum AdvisoryServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Not found error
    #[error("Advisory not found: {0}")]
    NotFound(String),

    /// Stored data could not be interpreted
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

impl From<RepositoryError> for AdvisoryServiceError {
    fn from(err: RepositoryError) -> Self {
        AdvisoryServiceError::RepositoryError(err.to_string())
    }
}

/// Trait for managing a user's advisories
#[async_trait]
pub trait AdvisoryServiceTrait: Send + Sync {
    /// Advisories ordered by priority (urgent first), then newest trigger time
    async fn list_advisories(&self, user_id: &str, filter: AdvisoryFilter) -> Result<Vec<Advisory>, AdvisoryServiceError>;

    async fn mark_read(&self, user_id: &str, id: &str) -> Result<Advisory, AdvisoryServiceError>;

    async fn dismiss(&self, user_id: &str, id: &str) -> Result<Advisory, AdvisoryServiceError>;

    async fn mark_action_taken(&self, user_id: &str, id: &str) -> Result<Advisory, AdvisoryServiceError>;

    async fn delete_advisory(&self, user_id: &str, id: &str) -> Result<(), AdvisoryServiceError>;
}

/// Advisory service
pub struct AdvisoryService {
    repository: SharedAdvisoryRepository,
}

impl AdvisoryService {
    /// Create a new advisory service
    pub fn new(repository: SharedAdvisoryRepository) -> Self {
        Self { repository }
    }

    /// Resolve an id to an advisory owned by `user_id`; anyone else's advisory is not found
    async fn owned_id(&self, user_id: &str, id: &str) -> Result<uuid::Uuid, AdvisoryServiceError> {
        let id_uuid = conversions::parse_string_to_uuid(id).map_err(AdvisoryServiceError::ValidationError)?;
        match self.repository.get_by_id(id_uuid).await? {
            Some(record) if record.user_id == user_id => Ok(id_uuid),
            _ => Err(AdvisoryServiceError::NotFound(format!("Advisory with ID {} not found", id))),
        }
    }

    async fn set_flag(&self, user_id: &str, id: &str, flag: AdvisoryFlag) -> Result<Advisory, AdvisoryServiceError> {
        let id_uuid = self.owned_id(user_id, id).await?;
        let record = self.repository
            .set_flag(id_uuid, flag)
            .await?
            .ok_or_else(|| AdvisoryServiceError::NotFound(format!("Advisory with ID {} not found", id)))?;

        info!("Set {} on advisory {} for user {}", flag.column(), id, user_id);
        conversions::convert_to_domain_advisory(record).map_err(AdvisoryServiceError::ConfigurationError)
    }
}

#[async_trait]
impl AdvisoryServiceTrait for AdvisoryService {
    async fn list_advisories(&self, user_id: &str, filter: AdvisoryFilter) -> Result<Vec<Advisory>, AdvisoryServiceError> {
        let records = self.repository.list_for_user(user_id).await?;

        let mut advisories = Vec::with_capacity(records.len());
        for record in records {
            match conversions::convert_to_domain_advisory(record) {
                Ok(advisory) if filter.matches(&advisory) => advisories.push(advisory),
                Ok(_) => {}
                Err(e) => {
                    error!("Skipping unreadable advisory for user {}: {}", user_id, e);
                }
            }
        }

        advisories.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.trigger_time.cmp(&a.trigger_time))
        });
        Ok(advisories)
    }

    async fn mark_read(&self, user_id: &str, id: &str) -> Result<Advisory, AdvisoryServiceError> {
        self.set_flag(user_id, id, AdvisoryFlag::Read).await
    }

    async fn dismiss(&self, user_id: &str, id: &str) -> Result<Advisory, AdvisoryServiceError> {
        self.set_flag(user_id, id, AdvisoryFlag::Dismissed).await
    }

    async fn mark_action_taken(&self, user_id: &str, id: &str) -> Result<Advisory, AdvisoryServiceError> {
        self.set_flag(user_id, id, AdvisoryFlag::ActionTaken).await
    }

    async fn delete_advisory(&self, user_id: &str, id: &str) -> Result<(), AdvisoryServiceError> {
        let id_uuid = self.owned_id(user_id, id).await?;
        if !self.repository.delete(id_uuid).await? {
            return Err(AdvisoryServiceError::NotFound(format!("Advisory with ID {} not found", id)));
        }
        info!("Deleted advisory {} for user {}", id, user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use async_trait::async_trait;
    use mockall::mock;
    use serde_json::json;
    use uuid::Uuid;
    use gluco_guide_data::models::{AdvisoryRecord, CreateAdvisoryRecord};
    use gluco_guide_data::repository::mocks::MockAdvisoryRepository;
    use gluco_guide_data::repository::AdvisoryRepositoryTrait;
    use crate::entities::AdvisoryPriority;

    mock! {
        pub FlakySink {}

        #[async_trait]
        impl AdvisoryRepositoryTrait for FlakySink {
            async fn create(&self, request: CreateAdvisoryRecord) -> Result<AdvisoryRecord, RepositoryError>;
            async fn get_by_id(&self, id: Uuid) -> Result<Option<AdvisoryRecord>, RepositoryError>;
            async fn list_for_user(&self, user_id: &str) -> Result<Vec<AdvisoryRecord>, RepositoryError>;
            async fn set_flag(&self, id: Uuid, flag: AdvisoryFlag) -> Result<Option<AdvisoryRecord>, RepositoryError>;
            async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
        }
    }

    fn draft(user_id: &str, priority: &str, trigger_time: &str) -> CreateAdvisoryRecord {
        CreateAdvisoryRecord {
            user_id: user_id.to_string(),
            reading_id: Some("reading-1".to_string()),
            category: "general".to_string(),
            priority: priority.to_string(),
            title: "High blood sugar".to_string(),
            description: "Above target".to_string(),
            suggested_action: "Drink water".to_string(),
            trigger_type: "blood_sugar_high".to_string(),
            trigger_payload: json!({ "reading_id": "reading-1" }),
            trigger_time: trigger_time.to_string(),
        }
    }

    async fn seeded() -> (Arc<MockAdvisoryRepository>, AdvisoryService, Vec<String>) {
        let repo = Arc::new(MockAdvisoryRepository::new());
        let mut ids = Vec::new();
        for (priority, time) in [
            ("medium", "2024-03-01T08:00:00.000Z"),
            ("high", "2024-03-01T07:00:00.000Z"),
            ("medium", "2024-03-02T08:00:00.000Z"),
            ("low", "2024-03-03T08:00:00.000Z"),
        ] {
            ids.push(repo.create(draft("user-1", priority, time)).await.unwrap().id);
        }
        repo.create(draft("user-2", "urgent", "2024-03-04T08:00:00.000Z")).await.unwrap();
        let service = AdvisoryService::new(repo.clone());
        (repo, service, ids)
    }

    #[tokio::test]
    async fn test_list_orders_by_priority_then_newest() {
        let (_, service, ids) = seeded().await;
        let listed = service.list_advisories("user-1", AdvisoryFilter::default()).await.unwrap();

        let listed_ids: Vec<&str> = listed.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(listed_ids, vec![ids[1].as_str(), ids[2].as_str(), ids[0].as_str(), ids[3].as_str()]);
        assert_eq!(listed[0].priority, AdvisoryPriority::High);
    }

    #[tokio::test]
    async fn test_unread_and_dismissed_filters() {
        let (_, service, ids) = seeded().await;
        service.mark_read("user-1", &ids[0]).await.unwrap();
        service.dismiss("user-1", &ids[1]).await.unwrap();

        let unread = service
            .list_advisories("user-1", AdvisoryFilter { unread_only: true, include_dismissed: false })
            .await
            .unwrap();
        assert_eq!(unread.len(), 2);

        let everything = service
            .list_advisories("user-1", AdvisoryFilter { unread_only: false, include_dismissed: true })
            .await
            .unwrap();
        assert_eq!(everything.len(), 4);
        assert!(everything.iter().any(|a| a.is_dismissed));
    }

    #[tokio::test]
    async fn test_flags_and_delete_are_scoped_to_owner() {
        let (repo, service, ids) = seeded().await;

        let result = service.mark_action_taken("user-2", &ids[0]).await;
        assert!(matches!(result, Err(AdvisoryServiceError::NotFound(_))));
        assert!(matches!(service.delete_advisory("user-2", &ids[0]).await, Err(AdvisoryServiceError::NotFound(_))));

        let updated = service.mark_action_taken("user-1", &ids[0]).await.unwrap();
        assert!(updated.action_taken);

        service.delete_advisory("user-1", &ids[0]).await.unwrap();
        assert_eq!(repo.stored().len(), 4);
        assert!(matches!(service.mark_read("user-1", &ids[0]).await, Err(AdvisoryServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_malformed_id_is_a_validation_error() {
        let (_, service, _) = seeded().await;
        assert!(matches!(service.dismiss("user-1", "42").await, Err(AdvisoryServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_sink_outage_surfaces_as_repository_error() {
        let mut sink = MockFlakySink::new();
        sink.expect_list_for_user()
            .returning(|_| Err(RepositoryError::Unavailable("connection refused".to_string())));

        let service = AdvisoryService::new(Arc::new(sink));
        let result = service.list_advisories("user-1", AdvisoryFilter::default()).await;
        assert!(matches!(result, Err(AdvisoryServiceError::RepositoryError(_))));
    }
}
