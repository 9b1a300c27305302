//! Violation entity model.

use ppewatch_core::types::{DbId, Timestamp, UserId};
use serde::Serialize;
use sqlx::FromRow;

/// Severity assigned to violations created at detection time.
pub const DEFAULT_SEVERITY: &str = "high";

/// A row from the `violations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Violation {
    pub id: DbId,
    pub detection_id: DbId,
    pub user_id: UserId,
    pub missing_ppe: String,
    pub severity: String,
    pub location: Option<String>,
    pub resolved: bool,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
