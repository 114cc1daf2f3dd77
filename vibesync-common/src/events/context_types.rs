//! Listening and calendar context types
//!
//! These arrive from the upstream producer (the polling client that watches
//! the music player and the calendar) and are passed through to the
//! classifier and, for `now_playing`/`next_event`, to the dashboards.

use serde::{Deserialize, Serialize};

/// Numerical audio analysis of the current track, when the player provides it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    /// Musical positiveness, 0.0 to 1.0
    pub valence: f64,
    /// Perceived intensity, 0.0 to 1.0
    pub energy: f64,
    /// Beats per minute
    pub tempo: f64,
    /// Suitability for dancing, 0.0 to 1.0
    pub danceability: f64,
}

/// Snapshot of the track currently playing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicContext {
    /// Track title
    pub name: String,
    /// Primary artist name
    pub artist: String,
    /// Album title (empty when unknown)
    #[serde(default)]
    pub album: String,
    /// Cover art URL for the dashboard
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_art_url: Option<String>,
    /// Genres of the primary artist
    #[serde(default)]
    pub artist_genres: Vec<String>,
    /// Popularity score reported by the player (0-100)
    #[serde(default)]
    pub popularity: u32,
    /// Audio analysis, absent when the player does not expose it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_features: Option<AudioFeatures>,
}

/// One upcoming calendar event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Event title (empty when the calendar has none)
    #[serde(default)]
    pub summary: String,
    /// Free-text description (empty when none)
    #[serde(default)]
    pub description: String,
    /// Start time as reported by the calendar (RFC 3339 or a bare date for all-day events)
    #[serde(default)]
    pub start_time: String,
    /// Whole minutes until the event starts
    pub minutes_until: u32,
    /// Location (empty when none)
    #[serde(default)]
    pub location: String,
}

/// A track from the user's recent listening history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentTrack {
    pub name: String,
    pub artist: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Inbound context update: one evaluation cycle's worth of input
///
/// `events` is ordered soonest first. Only `events[0]` takes part in
/// alerting; the whole list goes to the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextUpdate {
    pub track: MusicContext,
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
    #[serde(default)]
    pub recent_tracks: Vec<RecentTrack>,
}
