//! Status types and the status bus
//!
//! `VibeStatus` is the one broadcastable dashboard state. The relay holds
//! exactly one current status per process and replaces it on every
//! evaluation; `StatusBus` caches that value and fans it out to listeners.

mod context_types;
mod judgment_types;

pub use context_types::{AudioFeatures, CalendarEvent, ContextUpdate, MusicContext, RecentTrack};
pub use judgment_types::{Judgment, Severity, SongRecommendation, MAX_COMPATIBILITY_SCORE, UNKNOWN};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Message of the status every process starts with
pub const STARTING_MESSAGE: &str = "System starting...";

/// Message published when the upstream producer reports nothing playing
pub const NO_MUSIC_MESSAGE: &str = "No music currently playing";

/// Dashboard status
///
/// Serialized with a `type` discriminant of `IDLE`, `SYNCED` or
/// `VIBE_MISMATCH`. Dashboards must cope with every optional field being
/// absent or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VibeStatus {
    /// No active music session
    #[serde(rename = "IDLE")]
    Idle { message: String },

    /// Music fits the schedule (or there is nothing to fit)
    #[serde(rename = "SYNCED")]
    Synced {
        compatibility_score: u8,
        music_mood: String,
        task_intent: String,
        #[serde(default)]
        song_recommendations: Vec<SongRecommendation>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        now_playing: Option<MusicContext>,
        timestamp: DateTime<Utc>,
    },

    /// Music does not fit the next event
    #[serde(rename = "VIBE_MISMATCH")]
    Mismatch {
        severity: Severity,
        compatibility_score: u8,
        music_mood: String,
        task_intent: String,
        /// Always serialized, as `null` when the classifier gave no advice
        transition_suggestion: Option<String>,
        #[serde(default)]
        song_recommendations: Vec<SongRecommendation>,
        next_event: CalendarEvent,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        now_playing: Option<MusicContext>,
        timestamp: DateTime<Utc>,
    },
}

impl VibeStatus {
    /// Idle status with a custom message
    pub fn idle(message: impl Into<String>) -> Self {
        VibeStatus::Idle {
            message: message.into(),
        }
    }

    /// Status every process starts with
    pub fn starting() -> Self {
        Self::idle(STARTING_MESSAGE)
    }

    /// Status for the explicit idle signal
    pub fn no_music() -> Self {
        Self::idle(NO_MUSIC_MESSAGE)
    }

    /// Wire discriminant of this status
    pub fn kind(&self) -> &'static str {
        match self {
            VibeStatus::Idle { .. } => "IDLE",
            VibeStatus::Synced { .. } => "SYNCED",
            VibeStatus::Mismatch { .. } => "VIBE_MISMATCH",
        }
    }

    /// Compatibility score, if this status carries one
    pub fn compatibility_score(&self) -> Option<u8> {
        match self {
            VibeStatus::Idle { .. } => None,
            VibeStatus::Synced {
                compatibility_score,
                ..
            }
            | VibeStatus::Mismatch {
                compatibility_score,
                ..
            } => Some(*compatibility_score),
        }
    }

    /// Attach the track that was playing when this status was computed
    ///
    /// Idle statuses have no track and are returned unchanged.
    pub fn with_now_playing(self, track: MusicContext) -> Self {
        match self {
            VibeStatus::Idle { .. } => self,
            VibeStatus::Synced {
                compatibility_score,
                music_mood,
                task_intent,
                song_recommendations,
                timestamp,
                ..
            } => VibeStatus::Synced {
                compatibility_score,
                music_mood,
                task_intent,
                song_recommendations,
                now_playing: Some(track),
                timestamp,
            },
            VibeStatus::Mismatch {
                severity,
                compatibility_score,
                music_mood,
                task_intent,
                transition_suggestion,
                song_recommendations,
                next_event,
                timestamp,
                ..
            } => VibeStatus::Mismatch {
                severity,
                compatibility_score,
                music_mood,
                task_intent,
                transition_suggestion,
                song_recommendations,
                next_event,
                now_playing: Some(track),
                timestamp,
            },
        }
    }
}

// ========================================
// StatusBus Implementation
// ========================================

/// Cached current status plus broadcast fan-out
///
/// The StatusBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow listeners don't block the relay)
/// - Multiple concurrent listeners
/// - Automatic cleanup when listeners drop
///
/// The current status lives behind an `RwLock`. `publish` replaces it and
/// sends while holding the write lock, and `snapshot_and_subscribe`
/// subscribes while holding the read lock, so a joining listener sees every
/// status exactly once: either in its snapshot or on its receiver.
///
/// # Examples
///
/// ```
/// use vibesync_common::events::{StatusBus, VibeStatus};
///
/// # tokio_test_block(async {
/// let bus = StatusBus::new(100);
/// let (current, mut rx) = bus.snapshot_and_subscribe().await;
/// assert_eq!(current.kind(), "IDLE");
///
/// bus.publish(VibeStatus::no_music()).await;
/// assert_eq!(rx.recv().await.unwrap(), VibeStatus::no_music());
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone)]
pub struct StatusBus {
    tx: broadcast::Sender<VibeStatus>,
    current: Arc<RwLock<VibeStatus>>,
    capacity: usize,
}

impl StatusBus {
    /// Creates a new StatusBus holding the starting status
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of statuses buffered per listener before the
    ///   slowest listener starts skipping (100 is plenty for dashboards)
    pub fn new(capacity: usize) -> Self {
        Self::with_initial(capacity, VibeStatus::starting())
    }

    /// Creates a new StatusBus holding `initial` as the current status
    pub fn with_initial(capacity: usize, initial: VibeStatus) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            current: Arc::new(RwLock::new(initial)),
            capacity,
        }
    }

    /// Replace the current status and send it to every listener
    ///
    /// Returns the number of listeners that received it (0 is fine; the
    /// cached value still reaches late joiners).
    pub async fn publish(&self, status: VibeStatus) -> usize {
        let mut current = self.current.write().await;
        *current = status.clone();
        self.tx.send(status).unwrap_or(0)
    }

    /// Clone of the cached current status
    pub async fn current(&self) -> VibeStatus {
        self.current.read().await.clone()
    }

    /// Current status plus a receiver for every later status
    pub async fn snapshot_and_subscribe(&self) -> (VibeStatus, broadcast::Receiver<VibeStatus>) {
        let current = self.current.read().await;
        let rx = self.tx.subscribe();
        (current.clone(), rx)
    }

    /// Get the current number of active listeners
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
