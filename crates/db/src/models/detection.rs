//! Detection entity model and DTOs.

use ppewatch_core::ppe::PpeStatus;
use ppewatch_core::types::{DbId, Timestamp, UserId};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `detections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Detection {
    pub id: DbId,
    pub user_id: UserId,
    pub image_url: String,
    pub detection_results: serde_json::Value,
    pub overall_status: String,
    pub confidence_score: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a detection.
#[derive(Debug, Clone)]
pub struct CreateDetection {
    pub user_id: UserId,
    pub image_url: String,
    pub detection_results: serde_json::Value,
    pub overall_status: PpeStatus,
    pub confidence_score: f64,
}
