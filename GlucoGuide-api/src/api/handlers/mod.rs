pub mod advisories;
pub mod health;
pub mod readings;
pub mod target_ranges;

// Re-export handlers for easier imports
pub use advisories::{delete_advisory, dismiss, list_advisories, mark_action_taken, mark_read};
pub use health::health_check;
pub use readings::{delete_reading, get_reading, get_statistics, record_reading};
pub use target_ranges::{get_target_range, set_target_range};
