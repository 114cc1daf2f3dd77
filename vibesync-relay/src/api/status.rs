//! Current status endpoint

use axum::{extract::State, Json};
use vibesync_common::VibeStatus;

use crate::AppState;

/// GET /api/status - cached current status
pub async fn get_status(State(state): State<AppState>) -> Json<VibeStatus> {
    Json(state.session.current_status().await)
}
