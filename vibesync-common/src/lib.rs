//! # VibeSync Common Library
//!
//! Shared code for the VibeSync relay and its tooling:
//! - Listening and calendar context types (inbound payloads)
//! - Classifier judgment types
//! - Dashboard status (`VibeStatus`) and the `StatusBus` that caches and broadcasts it
//! - SSE stream helpers
//! - Configuration loading

pub mod config;
pub mod error;
pub mod events;
pub mod sse;

pub use error::{Error, Result};
pub use events::{StatusBus, VibeStatus};
