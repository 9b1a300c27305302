//! Handlers for per-user detection settings.

use axum::extract::State;
use axum::Json;
use ppewatch_core::settings::EffectiveSettings;
use ppewatch_db::models::user_settings::SaveUserSettings;
use ppewatch_db::repositories::UserSettingsRepo;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::{SaveSettingsResponse, SettingsResponse};
use crate::state::AppState;

/// POST /api/v1/settings
///
/// Overwrites the caller's full settings row; absent fields are stored as NULL.
pub async fn save_settings(
    user: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<SaveUserSettings>,
) -> AppResult<Json<SaveSettingsResponse>> {
    input.validate()?;
    let settings = UserSettingsRepo::upsert(&state.pool, user.user_id, &input).await?;

    tracing::info!(user_id = %user.user_id, "Settings saved");

    Ok(Json(SaveSettingsResponse {
        success: true,
        settings,
    }))
}

/// GET /api/v1/settings
///
/// Returns defaults, without writing them, when nothing was saved yet.
pub async fn get_settings(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<SettingsResponse>> {
    let stored = UserSettingsRepo::find_by_user(&state.pool, user.user_id).await?;

    let response = match stored {
        Some(row) => SettingsResponse {
            settings: row.effective(),
            persisted: true,
        },
        None => SettingsResponse {
            settings: EffectiveSettings::default(),
            persisted: false,
        },
    };
    Ok(Json(response))
}
