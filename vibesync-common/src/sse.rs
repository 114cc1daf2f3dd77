//! Server-Sent Events (SSE) utilities
//!
//! Shared SSE implementation for the relay and the demo relay: every
//! listener first receives the cached current status, then each later one.

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::events::{StatusBus, VibeStatus};

/// SSE event name carrying a serialized `VibeStatus`
pub const STATUS_EVENT_NAME: &str = "vibe_update";

/// Keep-alive comment interval
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Logs the disconnect when the listener's stream is dropped
struct ListenerGuard {
    id: Uuid,
    service_name: &'static str,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        info!(listener_id = %self.id, "Listener disconnected from {}", self.service_name);
    }
}

/// Convert a status into an SSE event, `None` if it cannot be serialized
pub fn status_event(status: &VibeStatus) -> Option<Event> {
    match Event::default().event(STATUS_EVENT_NAME).json_data(status) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!("Failed to serialize {} status: {}", status.kind(), e);
            None
        }
    }
}

/// Create the status SSE stream for one new listener
///
/// Connect and disconnect are logged with a per-listener id. Neither
/// touches any relay state beyond the broadcast receiver count.
///
/// # Arguments
/// * `bus` - Status bus to snapshot and subscribe to
/// * `service_name` - Name of the service for logging (e.g., "vibesync-relay")
pub async fn create_status_sse_stream(
    bus: &StatusBus,
    service_name: &'static str,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (initial, mut rx) = bus.snapshot_and_subscribe().await;
    let guard = ListenerGuard {
        id: Uuid::new_v4(),
        service_name,
    };
    info!(
        listener_id = %guard.id,
        listeners = bus.subscriber_count(),
        "Listener connected to {}", service_name
    );

    let stream = async_stream::stream! {
        let guard = guard;

        if let Some(event) = status_event(&initial) {
            yield Ok(event);
        }

        loop {
            match rx.recv().await {
                Ok(status) => {
                    debug!(listener_id = %guard.id, "SSE: sending {} status", status.kind());
                    if let Some(event) = status_event(&status) {
                        yield Ok(event);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(listener_id = %guard.id, skipped, "SSE listener lagged, skipping stale statuses");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    )
}
