//! vibesync-relay library
//!
//! Relays listening + calendar context to the compatibility classifier,
//! turns its judgment into a de-duplicated dashboard status, and streams
//! that status to every connected dashboard over SSE.

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use vibesync_common::config::RelayConfig;
use vibesync_common::StatusBus;

pub mod api;
pub mod classifier;
pub mod cli;
pub mod error;
pub mod evaluator;
pub mod session;

pub use crate::error::{ApiError, ApiResult};
pub use crate::session::SessionBroadcaster;

use crate::classifier::{ClassifierError, ClassifierGateway, OpenAiOracle};
use crate::evaluator::AlertEvaluator;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Evaluation session and status bus
    pub session: SessionBroadcaster,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(session: SessionBroadcaster) -> Self {
        Self {
            session,
            startup_time: Utc::now(),
        }
    }
}

/// Wire the HTTP oracle, gateway, evaluator and status bus from config
pub fn build_session(config: &RelayConfig) -> Result<SessionBroadcaster, ClassifierError> {
    let oracle = Arc::new(OpenAiOracle::new(&config.classifier)?);
    let gateway = ClassifierGateway::new(oracle, config.classifier.timeout);
    let evaluator = AlertEvaluator::new(config.compatibility_threshold);
    let bus = StatusBus::new(config.status_channel_capacity);
    Ok(SessionBroadcaster::new(gateway, evaluator, bus))
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::context_routes())
        .route("/api/status", get(api::get_status))
        .route("/events", get(api::event_stream))
        .merge(api::health_routes())
        .fallback(api::not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
