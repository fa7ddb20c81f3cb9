use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use gluco_guide_domain::entities::AdvisoryFilter;

/// Query parameters for listing advisories
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct AdvisoryQueryParams {
    /// Only advisories not yet read (default: false)
    pub unread_only: Option<bool>,

    /// Include dismissed advisories (default: false)
    pub include_dismissed: Option<bool>,
}

impl From<AdvisoryQueryParams> for AdvisoryFilter {
    fn from(params: AdvisoryQueryParams) -> Self {
        AdvisoryFilter {
            unread_only: params.unread_only.unwrap_or(false),
            include_dismissed: params.include_dismissed.unwrap_or(false),
        }
    }
}
