//! Repository for the `analytics_summary` table.

use chrono::NaiveDate;
use ppewatch_core::aggregation::DailyTally;
use ppewatch_core::types::UserId;
use sqlx::{PgConnection, PgPool};

use crate::models::analytics::AnalyticsSummary;

/// Column list for `analytics_summary` queries.
const COLUMNS: &str = "id, user_id, date, total_detections, compliant_count, \
    violation_count, partial_count, avg_confidence, created_at, updated_at";

/// Provides the atomic daily increment and window reads.
pub struct AnalyticsRepo;

impl AnalyticsRepo {
    /// Add `delta` to the (user, date) row, creating it if absent.
    ///
    /// A single `INSERT .. ON CONFLICT DO UPDATE` performs the arithmetic in
    /// the database, so concurrent increments for the same day serialize on
    /// the row lock instead of overwriting each other. The UPDATE arm reads
    /// the pre-update values of `s`, so the running mean uses the old total.
    pub async fn increment_in(
        conn: &mut PgConnection,
        user_id: UserId,
        date: NaiveDate,
        delta: &DailyTally,
    ) -> Result<AnalyticsSummary, sqlx::Error> {
        let query = format!(
            "INSERT INTO analytics_summary AS s \
                (user_id, date, total_detections, compliant_count, violation_count, \
                 partial_count, avg_confidence) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (user_id, date) DO UPDATE SET \
                avg_confidence = (s.avg_confidence * s.total_detections \
                    + EXCLUDED.avg_confidence * EXCLUDED.total_detections) \
                    / GREATEST(s.total_detections + EXCLUDED.total_detections, 1), \
                total_detections = s.total_detections + EXCLUDED.total_detections, \
                compliant_count = s.compliant_count + EXCLUDED.compliant_count, \
                violation_count = s.violation_count + EXCLUDED.violation_count, \
                partial_count = s.partial_count + EXCLUDED.partial_count \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AnalyticsSummary>(&query)
            .bind(user_id)
            .bind(date)
            .bind(delta.total_detections)
            .bind(delta.compliant_count)
            .bind(delta.violation_count)
            .bind(delta.partial_count)
            .bind(delta.avg_confidence)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find the row for one (user, date).
    pub async fn find(
        pool: &PgPool,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<Option<AnalyticsSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM analytics_summary WHERE user_id = $1 AND date = $2"
        );
        sqlx::query_as::<_, AnalyticsSummary>(&query)
            .bind(user_id)
            .bind(date)
            .fetch_optional(pool)
            .await
    }

    /// All rows for a user dated on or after `start`, ascending by date.
    pub async fn list_since(
        pool: &PgPool,
        user_id: UserId,
        start: NaiveDate,
    ) -> Result<Vec<AnalyticsSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM analytics_summary \
             WHERE user_id = $1 AND date >= $2 \
             ORDER BY date ASC"
        );
        sqlx::query_as::<_, AnalyticsSummary>(&query)
            .bind(user_id)
            .bind(start)
            .fetch_all(pool)
            .await
    }
}
