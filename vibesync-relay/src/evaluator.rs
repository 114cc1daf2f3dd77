//! Alert evaluator
//!
//! Decides whether a judgment becomes a SYNCED or VIBE_MISMATCH status and
//! suppresses repeated mismatches. One instance lives per relay process and
//! is owned by the session; it holds the only mutable decision state, the
//! dedup key of the last emitted mismatch.
//!
//! Visible behaviour is a small state machine over {Idle, Synced,
//! Mismatch(key)}: Mismatch(key) → Mismatch(same key) produces nothing,
//! every other transition produces exactly one status.

use chrono::Utc;
use tracing::debug;
use vibesync_common::config::DEFAULT_COMPATIBILITY_THRESHOLD;
use vibesync_common::events::{CalendarEvent, Judgment, Severity, VibeStatus, UNKNOWN};

/// Identity of a mismatch for suppression purposes
///
/// Only the score and the next event's summary take part; suggestion and
/// recommendations do not, so differently-worded advice for the same
/// situation is still treated as a repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupKey {
    pub score: u8,
    pub event_summary: String,
}

/// Result of one evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// New status to cache and broadcast
    Emit(VibeStatus),
    /// Same mismatch as last time; nothing to broadcast
    Suppressed,
}

impl Evaluation {
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Evaluation::Suppressed)
    }

    /// Emitted status, `None` when suppressed
    pub fn into_status(self) -> Option<VibeStatus> {
        match self {
            Evaluation::Emit(status) => Some(status),
            Evaluation::Suppressed => None,
        }
    }
}

/// Threshold + dedup state
#[derive(Debug, Clone)]
pub struct AlertEvaluator {
    threshold: u8,
    last_mismatch: Option<DedupKey>,
}

impl Default for AlertEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_COMPATIBILITY_THRESHOLD)
    }
}

impl AlertEvaluator {
    /// # Arguments
    ///
    /// * `threshold` - Scores strictly below this are mismatches (when an event is upcoming)
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold,
            last_mismatch: None,
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Dedup key of the last emitted mismatch, if the last emission was one
    pub fn last_mismatch(&self) -> Option<&DedupKey> {
        self.last_mismatch.as_ref()
    }

    /// Forget the last mismatch so the next one is always emitted
    pub fn reset(&mut self) {
        self.last_mismatch = None;
    }

    /// Turn a judgment into a status, or suppress a repeated mismatch
    ///
    /// `events` must be ordered soonest first; only `events[0]` is used.
    /// With no upcoming event the result is always SYNCED, however low the
    /// score: a mismatch is only actionable when there is something to
    /// transition for.
    pub fn evaluate(&mut self, judgment: Judgment, events: &[CalendarEvent]) -> Evaluation {
        let score = judgment.compatibility_score;

        match events.first() {
            Some(next_event) if score < self.threshold => {
                let key = DedupKey {
                    score,
                    event_summary: next_event.summary.clone(),
                };
                if self.last_mismatch.as_ref() == Some(&key) {
                    debug!(
                        score,
                        event = %key.event_summary,
                        "Suppressing duplicate mismatch"
                    );
                    return Evaluation::Suppressed;
                }
                self.last_mismatch = Some(key);

                Evaluation::Emit(VibeStatus::Mismatch {
                    severity: Severity::from_score(score),
                    compatibility_score: score,
                    music_mood: or_unknown(judgment.music_mood),
                    task_intent: or_unknown(judgment.task_intent),
                    transition_suggestion: judgment
                        .transition_suggestion
                        .filter(|s| !s.is_empty()),
                    song_recommendations: judgment.song_recommendations,
                    next_event: next_event.clone(),
                    now_playing: None,
                    timestamp: Utc::now(),
                })
            }
            _ => {
                self.last_mismatch = None;
                Evaluation::Emit(VibeStatus::Synced {
                    compatibility_score: score,
                    music_mood: or_unknown(judgment.music_mood),
                    task_intent: or_unknown(judgment.task_intent),
                    song_recommendations: judgment.song_recommendations,
                    now_playing: None,
                    timestamp: Utc::now(),
                })
            }
        }
    }
}

fn or_unknown(text: String) -> String {
    if text.is_empty() {
        UNKNOWN.to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibesync_common::events::SongRecommendation;

    fn judgment(score: u8) -> Judgment {
        Judgment {
            music_mood: "energizing party music".to_string(),
            task_intent: "deep-focus academic work".to_string(),
            compatibility_score: score,
            transition_suggestion: Some("Switch to lo-fi".to_string()),
            song_recommendations: vec![SongRecommendation {
                title: "Weightless".to_string(),
                artist: "Marconi Union".to_string(),
                reason: "Proven to reduce anxiety".to_string(),
            }],
        }
    }

    fn event(summary: &str) -> CalendarEvent {
        CalendarEvent {
            summary: summary.to_string(),
            description: String::new(),
            start_time: "2026-02-17T14:00:00-05:00".to_string(),
            minutes_until: 45,
            location: String::new(),
        }
    }

    fn lecture() -> Vec<CalendarEvent> {
        vec![event("CS 531 Lecture")]
    }

    #[test]
    fn test_low_score_with_event_is_high_mismatch() {
        let mut evaluator = AlertEvaluator::default();

        let status = evaluator
            .evaluate(judgment(25), &lecture())
            .into_status()
            .expect("first mismatch should be emitted");

        match status {
            VibeStatus::Mismatch {
                severity,
                compatibility_score,
                next_event,
                transition_suggestion,
                song_recommendations,
                ..
            } => {
                assert_eq!(severity, Severity::High);
                assert_eq!(compatibility_score, 25);
                assert_eq!(next_event.summary, "CS 531 Lecture");
                assert_eq!(transition_suggestion.as_deref(), Some("Switch to lo-fi"));
                assert_eq!(song_recommendations.len(), 1);
            }
            other => panic!("expected VIBE_MISMATCH, got {}", other.kind()),
        }
        assert_eq!(
            evaluator.last_mismatch(),
            Some(&DedupKey {
                score: 25,
                event_summary: "CS 531 Lecture".to_string()
            })
        );
    }

    #[test]
    fn test_identical_mismatch_suppressed_then_new_score_emits() {
        let mut evaluator = AlertEvaluator::default();

        assert!(!evaluator.evaluate(judgment(25), &lecture()).is_suppressed());
        assert!(evaluator.evaluate(judgment(25), &lecture()).is_suppressed());
        // Stored key unchanged by a suppression
        assert_eq!(evaluator.last_mismatch().unwrap().score, 25);

        let third = evaluator.evaluate(judgment(40), &lecture());
        match third {
            Evaluation::Emit(VibeStatus::Mismatch { severity, .. }) => {
                assert_eq!(severity, Severity::Medium)
            }
            other => panic!("expected emitted mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_same_score_different_event_emits() {
        let mut evaluator = AlertEvaluator::default();

        assert!(!evaluator.evaluate(judgment(25), &lecture()).is_suppressed());
        assert!(!evaluator
            .evaluate(judgment(25), &[event("Team sync")])
            .is_suppressed());
    }

    #[test]
    fn test_different_advice_same_key_still_suppressed() {
        let mut evaluator = AlertEvaluator::default();
        assert!(!evaluator.evaluate(judgment(25), &lecture()).is_suppressed());

        let mut reworded = judgment(25);
        reworded.transition_suggestion = Some("Try ambient instead".to_string());
        reworded.song_recommendations.clear();

        assert!(evaluator.evaluate(reworded, &lecture()).is_suppressed());
    }

    #[test]
    fn test_low_score_without_events_is_synced() {
        let mut evaluator = AlertEvaluator::default();

        let evaluation = evaluator.evaluate(judgment(25), &[]);

        match evaluation {
            Evaluation::Emit(VibeStatus::Synced {
                compatibility_score,
                ..
            }) => assert_eq!(compatibility_score, 25),
            other => panic!("expected SYNCED, got {:?}", other),
        }
        assert!(evaluator.last_mismatch().is_none());
    }

    #[test]
    fn test_high_score_is_synced_and_clears_key() {
        let mut evaluator = AlertEvaluator::default();
        evaluator.evaluate(judgment(25), &lecture());
        assert!(evaluator.last_mismatch().is_some());

        let evaluation = evaluator.evaluate(judgment(85), &lecture());

        let value = serde_json::to_value(evaluation.into_status().unwrap()).unwrap();
        assert_eq!(value["type"], "SYNCED");
        assert!(value.get("severity").is_none());
        assert!(value.get("transition_suggestion").is_none());
        assert!(value.get("next_event").is_none());
        assert!(evaluator.last_mismatch().is_none());

        // Key cleared: the earlier mismatch is emitted again
        assert!(!evaluator.evaluate(judgment(25), &lecture()).is_suppressed());
    }

    #[test]
    fn test_score_at_threshold_is_synced() {
        let mut evaluator = AlertEvaluator::default();
        let status = evaluator.evaluate(judgment(60), &lecture()).into_status().unwrap();
        assert_eq!(status.kind(), "SYNCED");

        let status = evaluator.evaluate(judgment(59), &lecture()).into_status().unwrap();
        assert_eq!(status.kind(), "VIBE_MISMATCH");
    }

    #[test]
    fn test_low_severity_only_with_raised_threshold() {
        let mut evaluator = AlertEvaluator::new(70);
        match evaluator.evaluate(judgment(65), &lecture()) {
            Evaluation::Emit(VibeStatus::Mismatch { severity, .. }) => {
                assert_eq!(severity, Severity::Low)
            }
            other => panic!("expected LOW mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_untitled_event_keys_on_empty_summary() {
        let mut evaluator = AlertEvaluator::default();

        assert!(!evaluator.evaluate(judgment(25), &[event("")]).is_suppressed());
        assert_eq!(
            evaluator.last_mismatch(),
            Some(&DedupKey {
                score: 25,
                event_summary: String::new()
            })
        );
    }

    #[test]
    fn test_reset_allows_repeat_mismatch() {
        let mut evaluator = AlertEvaluator::default();
        evaluator.evaluate(judgment(25), &lecture());
        evaluator.reset();

        assert!(!evaluator.evaluate(judgment(25), &lecture()).is_suppressed());
    }

    #[test]
    fn test_missing_optional_fields_normalize() {
        let mut evaluator = AlertEvaluator::default();
        let bare = Judgment {
            music_mood: String::new(),
            task_intent: String::new(),
            compatibility_score: 10,
            transition_suggestion: Some(String::new()),
            song_recommendations: Vec::new(),
        };

        let value = serde_json::to_value(
            evaluator.evaluate(bare, &lecture()).into_status().unwrap(),
        )
        .unwrap();

        assert_eq!(value["music_mood"], "unknown");
        assert_eq!(value["task_intent"], "unknown");
        assert!(value["transition_suggestion"].is_null());
        assert_eq!(value["song_recommendations"], serde_json::json!([]));
    }

    #[test]
    fn test_reply_without_advice_gives_null_suggestion_and_no_songs() {
        let reply = r#"{"music_mood":"calm","task_intent":"focus","compatibility_score":10}"#;
        let parsed = crate::classifier::normalize::parse_judgment(reply).unwrap();
        let mut evaluator = AlertEvaluator::default();

        let value = serde_json::to_value(
            evaluator.evaluate(parsed, &lecture()).into_status().unwrap(),
        )
        .unwrap();

        assert_eq!(value["type"], "VIBE_MISMATCH");
        assert_eq!(value["music_mood"], "calm");
        assert!(value
            .as_object()
            .unwrap()
            .contains_key("transition_suggestion"));
        assert!(value["transition_suggestion"].is_null());
        assert_eq!(value["song_recommendations"], serde_json::json!([]));
    }
}
