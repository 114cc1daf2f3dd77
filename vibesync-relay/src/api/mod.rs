//! HTTP API handlers for vibesync-relay

pub mod context;
pub mod health;
pub mod sse;
pub mod status;

pub use context::{context_routes, post_context, post_idle};
pub use health::health_routes;
pub use sse::event_stream;
pub use status::get_status;

use axum::http::Uri;

use crate::ApiError;

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
