//! Server-Sent Events (SSE) status stream
//!
//! Each listener receives the cached current status immediately, then
//! every later status change.

use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

/// GET /events - SSE status stream (event name `vibe_update`)
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    vibesync_common::sse::create_status_sse_stream(state.session.bus(), "vibesync-relay").await
}
