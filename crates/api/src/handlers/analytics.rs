//! Handlers for the analytics dashboard and its CSV and PDF exports.

use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use ppewatch_core::aggregation::WindowSummary;
use ppewatch_core::export::{daily_tallies_to_csv, daily_tallies_to_pdf, ReportHeading};
use ppewatch_db::repositories::{AnalyticsRepo, DetectionRepo, ViolationRepo};

use crate::error::AppResult;
use crate::extract::AppQuery;
use crate::middleware::auth::AuthUser;
use crate::query::WindowParams;
use crate::response::AnalyticsResponse;
use crate::state::AppState;

/// How many recent violations and detections the dashboard lists.
const RECENT_LIMIT: i64 = 10;

/// GET /api/v1/analytics?days=N
pub async fn get_analytics(
    user: AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<WindowParams>,
) -> AppResult<Json<AnalyticsResponse>> {
    let start = params.start(Utc::now().date_naive());

    let (analytics, violations, detections) = tokio::try_join!(
        AnalyticsRepo::list_since(&state.pool, user.user_id, start),
        ViolationRepo::list_open(&state.pool, user.user_id, RECENT_LIMIT),
        DetectionRepo::list_recent(&state.pool, user.user_id, RECENT_LIMIT),
    )?;

    let tallies: Vec<_> = analytics.iter().map(|row| row.tally()).collect();
    let summary = WindowSummary::from_days(&tallies);

    tracing::debug!(
        user_id = %user.user_id,
        days = params.days(),
        rows = analytics.len(),
        total = summary.total_detections,
        "Analytics window loaded",
    );

    Ok(Json(AnalyticsResponse {
        analytics,
        violations,
        detections,
        summary,
    }))
}

/// GET /api/v1/analytics/export.csv?days=N
pub async fn export_csv(
    user: AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<WindowParams>,
) -> AppResult<impl IntoResponse> {
    let today = Utc::now().date_naive();
    let rows = AnalyticsRepo::list_since(&state.pool, user.user_id, params.start(today)).await?;

    let tallies: Vec<_> = rows.iter().map(|row| (row.date, row.tally())).collect();
    let csv = daily_tallies_to_csv(tallies.iter().map(|(date, tally)| (*date, tally)));
    let disposition = format!("attachment; filename=\"ppe-analytics-{today}.csv\"");

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

/// GET /api/v1/analytics/export.pdf?days=N
pub async fn export_pdf(
    user: AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<WindowParams>,
) -> AppResult<impl IntoResponse> {
    let today = Utc::now().date_naive();
    let rows = AnalyticsRepo::list_since(&state.pool, user.user_id, params.start(today)).await?;

    let tallies: Vec<_> = rows.iter().map(|row| (row.date, row.tally())).collect();
    let summary = WindowSummary::from_days(tallies.iter().map(|(_, tally)| tally));
    let heading = ReportHeading {
        generated_on: today,
        window_days: params.days(),
    };
    let pdf = daily_tallies_to_pdf(
        heading,
        &summary,
        tallies.iter().map(|(date, tally)| (*date, tally)),
    )?;

    tracing::debug!(user_id = %user.user_id, rows = rows.len(), size = pdf.len(), "Analytics PDF rendered");

    let disposition = format!("attachment; filename=\"ppe-analytics-{today}.pdf\"");
    Ok((
        [
            (CONTENT_TYPE, "application/pdf".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    ))
}
