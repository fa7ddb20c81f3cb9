// Domain entities and value objects
pub mod advisory;
pub mod conversions;
pub mod reading;
pub mod statistics;
pub mod target_range;

// Re-export common types for easier imports
pub use advisory::{Advisory, AdvisoryCategory, AdvisoryDraft, AdvisoryFilter, AdvisoryPriority, TriggerType};
pub use reading::{
    CreateReadingRequest, ExerciseDetails, MealItem, MetricFamily, NormalizedReading, Reading, RecordedReading, Unit,
};
pub use statistics::{GroupStats, StatisticsPeriod, StatisticsSnapshot, TimeWindow};
pub use target_range::{SetTargetRangeRequest, TargetRange};
