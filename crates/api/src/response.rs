//! Response bodies returned by the API handlers.

use ppewatch_core::aggregation::WindowSummary;
use ppewatch_core::settings::EffectiveSettings;
use ppewatch_db::models::analytics::AnalyticsSummary;
use ppewatch_db::models::detection::Detection;
use ppewatch_db::models::user_settings::UserSettings;
use ppewatch_db::models::violation::Violation;
use serde::Serialize;

/// `POST /detections` result.
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub success: bool,
    pub detection: Detection,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// `GET /detections/{id}` result.
#[derive(Debug, Serialize)]
pub struct DetectionDetail {
    pub detection: Detection,
    pub violations: Vec<Violation>,
}

/// `GET /analytics` result.
#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    /// Daily rows in the window, oldest first.
    pub analytics: Vec<AnalyticsSummary>,
    /// Most recent unresolved violations.
    pub violations: Vec<Violation>,
    /// Most recent detections.
    pub detections: Vec<Detection>,
    pub summary: WindowSummary,
}

/// `POST /settings` result: the row exactly as stored.
#[derive(Debug, Serialize)]
pub struct SaveSettingsResponse {
    pub success: bool,
    pub settings: UserSettings,
}

/// `GET /settings` result.
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub settings: EffectiveSettings,
    /// `false` when the user never saved settings and defaults are shown.
    pub persisted: bool,
}
