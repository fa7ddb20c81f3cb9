use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};
use validator::Validate;
use async_trait::async_trait;

use gluco_guide_data::repository::RepositoryError;

use crate::config::AnalyticsConfig;
use crate::entities::conversions;
use crate::entities::{MetricFamily, SetTargetRangeRequest, TargetRange};
use crate::services::normalizer::accepts_unit;
use crate::services::{describe_validation_errors, SharedTargetRangeRepository};

/// Target range service errors
#[derive(Debug, Error)]
pub enum TargetRangeServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Stored data could not be interpreted
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

impl From<RepositoryError> for TargetRangeServiceError {
    fn from(err: RepositoryError) -> Self {
        TargetRangeServiceError::RepositoryError(err.to_string())
    }
}

/// Trait for target range operations
#[async_trait]
pub trait TargetRangeServiceTrait: Send + Sync {
    /// The user's range for a family, or the family default when none is stored
    async fn get_target_range(&self, user_id: &str, family: MetricFamily) -> Result<TargetRange, TargetRangeServiceError>;

    /// Store a range after checking the unit and `min < max`
    async fn set_target_range(
        &self,
        user_id: &str,
        family: MetricFamily,
        request: SetTargetRangeRequest,
    ) -> Result<TargetRange, TargetRangeServiceError>;
}

/// Stored range for a user, falling back to the configured default
pub(crate) async fn load_target_range(
    repository: &SharedTargetRangeRepository,
    config: &AnalyticsConfig,
    user_id: &str,
    family: MetricFamily,
) -> Result<TargetRange, TargetRangeServiceError> {
    match repository.get(user_id, family.as_str()).await? {
        Some(record) => conversions::convert_to_domain_target_range(record)
            .map_err(TargetRangeServiceError::ConfigurationError),
        None => {
            debug!("No {} target range stored for user {}, using default", family, user_id);
            Ok(config.default_target_range(family))
        }
    }
}

/// Target range service
pub struct TargetRangeService {
    repository: SharedTargetRangeRepository,
    config: AnalyticsConfig,
}

impl TargetRangeService {
    /// Create a new target range service
    pub fn new(repository: SharedTargetRangeRepository, config: AnalyticsConfig) -> Self {
        Self { repository, config }
    }
}

#[async_trait]
impl TargetRangeServiceTrait for TargetRangeService {
    async fn get_target_range(&self, user_id: &str, family: MetricFamily) -> Result<TargetRange, TargetRangeServiceError> {
        load_target_range(&self.repository, &self.config, user_id, family).await
    }

    async fn set_target_range(
        &self,
        user_id: &str,
        family: MetricFamily,
        request: SetTargetRangeRequest,
    ) -> Result<TargetRange, TargetRangeServiceError> {
        request
            .validate()
            .map_err(|errors| TargetRangeServiceError::ValidationError(describe_validation_errors(&errors)))?;

        if !accepts_unit(family, request.unit) {
            return Err(TargetRangeServiceError::ValidationError(format!(
                "Unit {} is not valid for {} target ranges",
                request.unit, family
            )));
        }
        if !(request.min < request.max) {
            return Err(TargetRangeServiceError::ValidationError(
                "Target minimum must be less than target maximum".to_string(),
            ));
        }

        let range = TargetRange {
            metric_family: family,
            min: request.min,
            max: request.max,
            unit: request.unit,
            is_default: false,
        };
        self.repository
            .upsert(conversions::convert_to_data_target_range(user_id, &range, Utc::now()))
            .await?;

        info!("Stored {} target range {}-{} {} for user {}", family, range.min, range.max, range.unit, user_id);
        Ok(range)
    }
}
