// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for a connected Strava account.

use crate::error::{AppError, Result};
use crate::middleware::auth::StravaSession;
use crate::models::CalendarSnapshot;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require stored credentials).
/// The credential middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/calendar", get(get_calendar).post(generate_calendar))
        .route("/api/athlete", get(get_athlete))
}

// ─── Calendar ────────────────────────────────────────────────

/// Run a fresh aggregation and commit the result.
///
/// A failed run still commits whatever it collected; the response status
/// is 502 in that case so callers can tell a partial calendar apart.
async fn generate_calendar(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<CalendarSnapshot>)> {
    let run = state.aggregator.run().await?;
    let snapshot = run.into_snapshot(chrono::Utc::now());

    let status = if snapshot.outcome.is_complete() {
        StatusCode::OK
    } else {
        tracing::warn!(outcome = ?snapshot.outcome, "Committing partial calendar");
        StatusCode::BAD_GATEWAY
    };

    *state.calendar.write().await = Some(snapshot.clone());
    Ok((status, Json(snapshot)))
}

/// Last committed calendar.
async fn get_calendar(State(state): State<Arc<AppState>>) -> Result<Json<CalendarSnapshot>> {
    state
        .calendar
        .read()
        .await
        .clone()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No calendar generated yet".to_string()))
}

// ─── Athlete ─────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AthleteResponse {
    /// Name shown as "<name>'s Strava Activity"
    pub username: String,
}

/// Connected athlete's display name.
async fn get_athlete(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<StravaSession>,
) -> Result<Json<AthleteResponse>> {
    let athlete = state.strava.get_athlete(&session.access_token).await?;
    Ok(Json(AthleteResponse {
        username: athlete.display_name(),
    }))
}
