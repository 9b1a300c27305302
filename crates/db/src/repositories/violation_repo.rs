//! Repository for the `violations` table.

use ppewatch_core::ppe::PpeType;
use ppewatch_core::types::{DbId, UserId};
use sqlx::{PgConnection, PgPool};

use crate::models::violation::{Violation, DEFAULT_SEVERITY};

/// Column list for `violations` queries.
const COLUMNS: &str = "id, detection_id, user_id, missing_ppe, severity, location, \
    resolved, resolved_at, created_at";

/// Provides insert and listing operations for PPE violations.
pub struct ViolationRepo;

impl ViolationRepo {
    /// Insert one unresolved violation per missing category.
    pub async fn create_batch_in(
        conn: &mut PgConnection,
        detection_id: DbId,
        user_id: UserId,
        missing: &[PpeType],
    ) -> Result<Vec<Violation>, sqlx::Error> {
        let query = format!(
            "INSERT INTO violations (detection_id, user_id, missing_ppe, severity) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );

        let mut created = Vec::with_capacity(missing.len());
        for ppe in missing {
            let violation = sqlx::query_as::<_, Violation>(&query)
                .bind(detection_id)
                .bind(user_id)
                .bind(ppe.as_str())
                .bind(DEFAULT_SEVERITY)
                .fetch_one(&mut *conn)
                .await?;
            created.push(violation);
        }
        Ok(created)
    }

    /// Most recent unresolved violations for a user, newest first.
    pub async fn list_open(
        pool: &PgPool,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<Violation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM violations \
             WHERE user_id = $1 AND resolved = false \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, Violation>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// All violations raised by a single detection, in insertion order.
    pub async fn list_for_detection(
        pool: &PgPool,
        detection_id: DbId,
    ) -> Result<Vec<Violation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM violations WHERE detection_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, Violation>(&query)
            .bind(detection_id)
            .fetch_all(pool)
            .await
    }
}
