//! Repository for the `user_settings` table.

use ppewatch_core::types::UserId;
use sqlx::PgPool;

use crate::models::user_settings::{SaveUserSettings, UserSettings};

/// Column list for `user_settings` queries.
const COLUMNS: &str = "id, user_id, confidence_threshold, enabled_ppe_types, auto_alert, \
    save_snapshots, show_bboxes, created_at, updated_at";

/// Provides read and full-overwrite upsert of per-user settings.
pub struct UserSettingsRepo;

impl UserSettingsRepo {
    /// Find a user's settings. Returns `None` if they never saved any.
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: UserId,
    ) -> Result<Option<UserSettings>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_settings WHERE user_id = $1");
        sqlx::query_as::<_, UserSettings>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Upsert a user's settings. Creates if absent, overwrites every field if
    /// present.
    ///
    /// Uses `ON CONFLICT (user_id) DO UPDATE` to guarantee one row per user.
    pub async fn upsert(
        pool: &PgPool,
        user_id: UserId,
        input: &SaveUserSettings,
    ) -> Result<UserSettings, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_settings \
                (user_id, confidence_threshold, enabled_ppe_types, auto_alert, \
                 save_snapshots, show_bboxes) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (user_id) DO UPDATE \
             SET confidence_threshold = EXCLUDED.confidence_threshold, \
                 enabled_ppe_types = EXCLUDED.enabled_ppe_types, \
                 auto_alert = EXCLUDED.auto_alert, \
                 save_snapshots = EXCLUDED.save_snapshots, \
                 show_bboxes = EXCLUDED.show_bboxes \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSettings>(&query)
            .bind(user_id)
            .bind(input.confidence_threshold)
            .bind(&input.enabled_ppe_types)
            .bind(input.auto_alert)
            .bind(input.save_snapshots)
            .bind(input.show_bboxes)
            .fetch_one(pool)
            .await
    }
}
