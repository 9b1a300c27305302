pub mod analytics;
pub mod detection;
pub mod health;
pub mod settings;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /detections                  ingest image (POST)
/// /detections/{id}             detection with its violations (GET)
///
/// /analytics                   dashboard window (GET, ?days=)
/// /analytics/export.csv        window as CSV (GET, ?days=)
/// /analytics/export.pdf        window as PDF report (GET, ?days=)
///
/// /settings                    read (GET), overwrite (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/detections", detection::router())
        .nest("/analytics", analytics::router())
        .nest("/settings", settings::router())
}
