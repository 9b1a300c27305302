use axum::routing::{get, post};
use axum::Router;

use crate::handlers::detection;
use crate::state::AppState;

/// Detection routes mounted at `/detections`.
///
/// ```text
/// POST /      -> create_detection
/// GET  /{id}  -> get_detection
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(detection::create_detection))
        .route("/{id}", get(detection::get_detection))
}
