// Storage models, one module per table
pub mod advisory;
pub mod reading;
pub mod target_range;

pub use advisory::{AdvisoryFlag, AdvisoryRecord, CreateAdvisoryRecord};
pub use reading::{CreateReadingRecord, ReadingRecord};
pub use target_range::TargetRangeRecord;

use chrono::{DateTime, SecondsFormat, Utc};

/// Canonical timestamp text stored in every time column.
///
/// A fixed precision and the `Z` suffix keep lexical and chronological order
/// identical, which the range queries rely on.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
