//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` (or plain) DTO for inserts

pub mod analytics;
pub mod detection;
pub mod user_settings;
pub mod violation;
