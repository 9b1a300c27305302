use axum::routing::get;
use axum::Router;

use crate::handlers::settings;
use crate::state::AppState;

/// Settings routes mounted at `/settings`.
///
/// ```text
/// GET  /  -> get_settings
/// POST /  -> save_settings
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(settings::get_settings).post(settings::save_settings))
}
