//! Handlers for image ingestion and detection lookup.

use axum::extract::{Multipart, State};
use axum::Json;
use chrono::{DateTime, Utc};
use ppewatch_core::analysis::{parse_model_answer, ParseOutcome, DETECTION_PROMPT};
use ppewatch_core::error::CoreError;
use ppewatch_core::types::DbId;
use ppewatch_db::models::detection::CreateDetection;
use ppewatch_db::repositories::{DetectionRepo, RecordedDetection, ViolationRepo};
use ppewatch_storage::detection_image_key;

use crate::error::{AppError, AppResult};
use crate::extract::AppPath;
use crate::middleware::auth::AuthUser;
use crate::response::{DetectionDetail, IngestResponse};
use crate::state::AppState;

/// Multipart field carrying the image.
const IMAGE_FIELD: &str = "image";
/// Content type assumed when the client sends none.
const FALLBACK_CONTENT_TYPE: &str = "image/jpeg";

/// An image read from the request body.
struct Upload {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Read the `image` field, ignoring any other fields.
async fn read_image(multipart: &mut Multipart) -> AppResult<Upload> {
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();
        let bytes = field.bytes().await?;
        upload = Some(Upload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    match upload {
        Some(upload) if !upload.bytes.is_empty() => Ok(upload),
        _ => Err(CoreError::MissingInput("No image provided".into()).into()),
    }
}

/// POST /api/v1/detections
///
/// Stores the uploaded image, asks the vision model for a PPE assessment and
/// records the detection, its violations and the daily summary increment.
/// An unusable model answer is replaced by the fixed fallback result; the
/// request still succeeds.
pub async fn create_detection(
    user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<IngestResponse>> {
    let upload = read_image(&mut multipart).await?;
    let now = Utc::now();

    let key = detection_image_key(user.user_id, now.timestamp_millis(), &upload.file_name);
    let stored = state
        .store
        .put(&key, &upload.bytes, &upload.content_type)
        .await?;

    let recorded = match analyze_and_record(&state, &user, &upload, &stored.public_url, now).await {
        Ok(recorded) => recorded,
        Err(err) => {
            discard_image(&state, &key).await;
            return Err(err);
        }
    };

    tracing::info!(
        user_id = %user.user_id,
        detection_id = recorded.detection.id,
        status = %recorded.detection.overall_status,
        violations = recorded.violations.len(),
        "Detection ingested",
    );

    Ok(Json(IngestResponse {
        success: true,
        detection: recorded.detection,
        image_url: stored.public_url,
    }))
}

/// Ask the vision model about the stored image and persist the result.
async fn analyze_and_record(
    state: &AppState,
    user: &AuthUser,
    upload: &Upload,
    image_url: &str,
    now: DateTime<Utc>,
) -> AppResult<RecordedDetection> {
    let answer = state
        .vision
        .analyze_image(DETECTION_PROMPT, &upload.content_type, &upload.bytes)
        .await?;

    let outcome = parse_model_answer(&answer);
    if let ParseOutcome::Fallback { reason, .. } = &outcome {
        tracing::warn!(user_id = %user.user_id, %reason, "Model answer unusable, storing fallback result");
    }
    let analysis = outcome.analysis();

    let (missing, unknown) = analysis.missing_categories();
    if !unknown.is_empty() {
        tracing::warn!(user_id = %user.user_id, ?unknown, "Dropping unrecognised missing PPE labels");
    }

    let input = CreateDetection {
        user_id: user.user_id,
        image_url: image_url.to_string(),
        detection_results: outcome.payload(),
        overall_status: analysis.status(),
        confidence_score: analysis.confidence(),
    };
    let recorded = DetectionRepo::record(&state.pool, &input, &missing, now.date_naive()).await?;
    Ok(recorded)
}

/// Remove an image whose detection was never recorded.
async fn discard_image(state: &AppState, key: &str) {
    if let Err(e) = state.store.delete(key).await {
        tracing::warn!(key, error = %e, "Failed to remove orphaned detection image");
    }
}

/// GET /api/v1/detections/{id}
///
/// Detections owned by someone else are reported as not found.
pub async fn get_detection(
    user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DetectionDetail>> {
    let detection = DetectionRepo::find_by_id(&state.pool, user.user_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Detection",
            id,
        }))?;
    let violations = ViolationRepo::list_for_detection(&state.pool, detection.id).await?;

    Ok(Json(DetectionDetail {
        detection,
        violations,
    }))
}
