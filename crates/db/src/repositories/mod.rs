//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument. Methods suffixed `_in` take a connection
//! instead so they can participate in a caller's transaction.

pub mod analytics_repo;
pub mod detection_repo;
pub mod user_settings_repo;
pub mod violation_repo;

pub use analytics_repo::AnalyticsRepo;
pub use detection_repo::{DetectionRepo, RecordedDetection};
pub use user_settings_repo::UserSettingsRepo;
pub use violation_repo::ViolationRepo;
