//! User settings entity model and DTOs.

use ppewatch_core::error::CoreError;
use ppewatch_core::settings::{
    validate_confidence_threshold, validate_enabled_ppe_types, EffectiveSettings,
};
use ppewatch_core::types::{DbId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `user_settings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserSettings {
    pub id: DbId,
    pub user_id: UserId,
    pub confidence_threshold: Option<f64>,
    pub enabled_ppe_types: Option<Vec<String>>,
    pub auto_alert: Option<bool>,
    pub save_snapshots: Option<bool>,
    pub show_bboxes: Option<bool>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserSettings {
    /// Stored values with unset fields replaced by defaults.
    pub fn effective(&self) -> EffectiveSettings {
        EffectiveSettings::resolve(
            self.confidence_threshold,
            self.enabled_ppe_types.clone(),
            self.auto_alert,
            self.save_snapshots,
            self.show_bboxes,
        )
    }
}

/// DTO for saving a user's settings.
///
/// Saving always overwrites the full field set: a field absent from the
/// payload is stored as NULL, not left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveUserSettings {
    pub confidence_threshold: Option<f64>,
    pub enabled_ppe_types: Option<Vec<String>>,
    pub auto_alert: Option<bool>,
    pub save_snapshots: Option<bool>,
    pub show_bboxes: Option<bool>,
}

impl SaveUserSettings {
    /// Validate the fields that are present.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(threshold) = self.confidence_threshold {
            validate_confidence_threshold(threshold)?;
        }
        if let Some(types) = &self.enabled_ppe_types {
            validate_enabled_ppe_types(types)?;
        }
        Ok(())
    }
}
