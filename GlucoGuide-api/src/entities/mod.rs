// Public entities for the GlucoGuide API
// Request shapes and query parameters owned by the HTTP layer. Response
// bodies reuse the domain entities directly.

pub mod advisories;

// Common entities for error handling
pub mod common;

pub mod readings;

pub use advisories::AdvisoryQueryParams;
pub use common::ErrorResponse;
pub use readings::{RecordReadingBody, StatisticsQueryParams};
