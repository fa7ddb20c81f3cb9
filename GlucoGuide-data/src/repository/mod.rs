// Repository module structure
pub mod errors;
mod advisory;
mod in_memory;
mod reading;
mod storage;
mod target_range;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use advisory::{AdvisoryRepository, AdvisoryRepositoryTrait};
pub use reading::{ReadingRepository, ReadingRepositoryTrait};
pub use target_range::{TargetRangeRepository, TargetRangeRepositoryTrait};

// Mock repositories for tests in this and downstream crates
#[cfg(any(test, feature = "mock"))]
pub mod mocks {
    pub use super::advisory::tests::MockAdvisoryRepository;
    pub use super::reading::tests::MockReadingRepository;
    pub use super::target_range::tests::MockTargetRangeRepository;
}
