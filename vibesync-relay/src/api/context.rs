//! Inbound producer endpoints
//!
//! The upstream producer (the client polling the music player and the
//! calendar) posts one context update per poll, or the idle signal when
//! nothing is playing.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::{error, warn};
use vibesync_common::events::ContextUpdate;
use vibesync_common::VibeStatus;

use crate::evaluator::Evaluation;
use crate::{ApiError, ApiResult, AppState};

/// Outcome of one context cycle
#[derive(Debug, Serialize)]
pub struct ContextResponse {
    /// "emitted" or "suppressed"
    pub outcome: &'static str,
    /// Wire type of the emitted status, absent when suppressed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
}

impl From<&Evaluation> for ContextResponse {
    fn from(evaluation: &Evaluation) -> Self {
        match evaluation {
            Evaluation::Emit(status) => ContextResponse {
                outcome: "emitted",
                status: Some(status.kind()),
            },
            Evaluation::Suppressed => ContextResponse {
                outcome: "suppressed",
                status: None,
            },
        }
    }
}

/// POST /api/context
///
/// Parses the body by hand so a malformed update is logged before it is
/// rejected; the cached status is left as it was.
///
/// The cycle runs on its own task: a producer that hangs up mid-cycle
/// must not cancel it between storing the dedup key and publishing.
pub async fn post_context(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<ContextResponse>)> {
    let update: ContextUpdate = serde_json::from_slice(&body).map_err(|e| {
        warn!("Processing error: malformed context update: {}", e);
        ApiError::BadRequest(format!("Malformed context update: {}", e))
    })?;

    let session = state.session.clone();
    let evaluation = tokio::spawn(async move { session.handle_context(update).await })
        .await
        .map_err(|e| {
            error!("Context cycle task failed: {}", e);
            ApiError::Internal(format!("Context cycle failed: {}", e))
        })?;
    Ok((StatusCode::ACCEPTED, Json(ContextResponse::from(&evaluation))))
}

/// POST /api/idle
pub async fn post_idle(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<VibeStatus>)> {
    let session = state.session.clone();
    let status = tokio::spawn(async move { session.handle_idle().await })
        .await
        .map_err(|e| {
            error!("Idle task failed: {}", e);
            ApiError::Internal(format!("Idle handling failed: {}", e))
        })?;
    Ok((StatusCode::ACCEPTED, Json(status)))
}

/// Build producer routes
pub fn context_routes() -> Router<AppState> {
    Router::new()
        .route("/api/context", post(post_context))
        .route("/api/idle", post(post_idle))
}
