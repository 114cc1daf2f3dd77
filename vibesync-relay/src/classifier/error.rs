//! Classifier error types
//!
//! These never leave the gateway: `ClassifierGateway::evaluate` collapses
//! every one of them into the fail-open judgment.

use std::time::Duration;
use thiserror::Error;

/// Classifier call, parse or validation failure
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Classifier call timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Classifier returned no content")]
    EmptyResponse,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid compatibility score: {0}")]
    InvalidScore(String),
}
