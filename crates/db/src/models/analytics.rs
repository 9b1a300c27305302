//! Daily analytics summary entity model.

use chrono::NaiveDate;
use ppewatch_core::aggregation::DailyTally;
use ppewatch_core::types::{DbId, Timestamp, UserId};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `analytics_summary` table: one per (user, UTC date).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnalyticsSummary {
    pub id: DbId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub total_detections: i64,
    pub compliant_count: i64,
    pub violation_count: i64,
    pub partial_count: i64,
    pub avg_confidence: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AnalyticsSummary {
    /// The row's counters as a mergeable tally.
    pub fn tally(&self) -> DailyTally {
        DailyTally {
            total_detections: self.total_detections,
            compliant_count: self.compliant_count,
            violation_count: self.violation_count,
            partial_count: self.partial_count,
            avg_confidence: self.avg_confidence,
        }
    }
}
