//! Classifier judgment types
//!
//! A `Judgment` is the normalized opinion of the external classifier about
//! how well the current music fits the upcoming schedule.

use serde::{Deserialize, Serialize};

/// Mood/intent placeholder used when the classifier gives nothing usable
pub const UNKNOWN: &str = "unknown";

/// Upper bound of the compatibility scale
pub const MAX_COMPATIBILITY_SCORE: u8 = 100;

/// A song the classifier suggests for the upcoming task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRecommendation {
    pub title: String,
    pub artist: String,
    /// Why the song fits the upcoming task
    #[serde(default)]
    pub reason: String,
}

/// Normalized classifier output
///
/// `compatibility_score` is always within 0..=100 once a `Judgment` exists;
/// normalization clamps whatever the classifier returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judgment {
    pub music_mood: String,
    pub task_intent: String,
    pub compatibility_score: u8,
    pub transition_suggestion: Option<String>,
    pub song_recommendations: Vec<SongRecommendation>,
}

impl Judgment {
    /// Fail-open judgment used whenever the classifier cannot be trusted
    ///
    /// Maximal compatibility so a broken classifier never raises an alert.
    pub fn fail_open() -> Self {
        Self {
            music_mood: UNKNOWN.to_string(),
            task_intent: UNKNOWN.to_string(),
            compatibility_score: MAX_COMPATIBILITY_SCORE,
            transition_suggestion: None,
            song_recommendations: Vec::new(),
        }
    }
}

/// How far the music is from what the next event needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Severity bands: below 30 is HIGH, 30-49 is MEDIUM, 50 and up is LOW
    pub fn from_score(score: u8) -> Self {
        if score < 30 {
            Severity::High
        } else if score < 50 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        };
        f.write_str(s)
    }
}
