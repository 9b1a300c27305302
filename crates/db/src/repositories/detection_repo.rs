//! Repository for the `detections` table.

use chrono::NaiveDate;
use ppewatch_core::aggregation::DailyTally;
use ppewatch_core::ppe::PpeType;
use ppewatch_core::types::{DbId, UserId};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use crate::models::analytics::AnalyticsSummary;
use crate::models::detection::{CreateDetection, Detection};
use crate::models::violation::Violation;
use crate::repositories::{AnalyticsRepo, ViolationRepo};

/// Column list for `detections` queries.
const COLUMNS: &str = "id, user_id, image_url, detection_results, overall_status, \
    confidence_score, created_at, updated_at";

/// Everything written for one ingested image.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedDetection {
    pub detection: Detection,
    pub violations: Vec<Violation>,
    pub summary: AnalyticsSummary,
}

/// Provides insert and listing operations for detections.
pub struct DetectionRepo;

impl DetectionRepo {
    /// Insert a detection row on an existing connection.
    pub async fn create_in(
        conn: &mut PgConnection,
        input: &CreateDetection,
    ) -> Result<Detection, sqlx::Error> {
        let query = format!(
            "INSERT INTO detections \
                (user_id, image_url, detection_results, overall_status, confidence_score) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Detection>(&query)
            .bind(input.user_id)
            .bind(&input.image_url)
            .bind(&input.detection_results)
            .bind(input.overall_status.as_str())
            .bind(input.confidence_score)
            .fetch_one(&mut *conn)
            .await
    }

    /// Persist a detection together with its violations and the daily
    /// summary increment, in one transaction.
    ///
    /// `date` is the UTC calendar day the detection counts towards.
    pub async fn record(
        pool: &PgPool,
        input: &CreateDetection,
        missing: &[PpeType],
        date: NaiveDate,
    ) -> Result<RecordedDetection, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let detection = Self::create_in(&mut tx, input).await?;
        let violations =
            ViolationRepo::create_batch_in(&mut tx, detection.id, input.user_id, missing).await?;
        let delta = DailyTally::single(input.overall_status, input.confidence_score);
        let summary = AnalyticsRepo::increment_in(&mut tx, input.user_id, date, &delta).await?;

        tx.commit().await?;

        tracing::debug!(
            detection_id = detection.id,
            violations = violations.len(),
            day_total = summary.total_detections,
            "Detection recorded",
        );

        Ok(RecordedDetection {
            detection,
            violations,
            summary,
        })
    }

    /// Find a detection by id, scoped to its owner.
    pub async fn find_by_id(
        pool: &PgPool,
        user_id: UserId,
        id: DbId,
    ) -> Result<Option<Detection>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM detections WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Detection>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Most recent detections for a user, newest first.
    pub async fn list_recent(
        pool: &PgPool,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<Detection>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM detections \
             WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, Detection>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
