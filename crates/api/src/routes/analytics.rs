use axum::routing::get;
use axum::Router;

use crate::handlers::analytics;
use crate::state::AppState;

/// Analytics routes mounted at `/analytics`.
///
/// ```text
/// GET /            -> get_analytics
/// GET /export.csv  -> export_csv
/// GET /export.pdf  -> export_pdf
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(analytics::get_analytics))
        .route("/export.csv", get(analytics::export_csv))
        .route("/export.pdf", get(analytics::export_pdf))
}
