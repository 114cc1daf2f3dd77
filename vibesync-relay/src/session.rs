//! Session broadcaster
//!
//! Runs one gateway + evaluator cycle per inbound context update and
//! publishes the result on the status bus, which caches it for listeners
//! that join later.
//!
//! Cycles are serialized only around the evaluator: the classifier call
//! runs without any lock so a slow call delays only its own cycle, then the
//! evaluator mutex is held across evaluate + publish. That keeps the dedup
//! read-modify-write atomic and the publication order equal to the
//! evaluation order when several producers submit at once.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use vibesync_common::events::{ContextUpdate, Judgment, StatusBus, VibeStatus};

use crate::classifier::ClassifierGateway;
use crate::evaluator::{AlertEvaluator, Evaluation};

/// Judgment used when there is no upcoming event to compare against
fn no_events_judgment() -> Judgment {
    Judgment {
        music_mood: "N/A".to_string(),
        task_intent: "No upcoming events".to_string(),
        compatibility_score: 100,
        transition_suggestion: None,
        song_recommendations: Vec::new(),
    }
}

/// Process-wide evaluation session
#[derive(Clone)]
pub struct SessionBroadcaster {
    gateway: ClassifierGateway,
    evaluator: Arc<Mutex<AlertEvaluator>>,
    bus: StatusBus,
}

impl SessionBroadcaster {
    pub fn new(gateway: ClassifierGateway, evaluator: AlertEvaluator, bus: StatusBus) -> Self {
        Self {
            gateway,
            evaluator: Arc::new(Mutex::new(evaluator)),
            bus,
        }
    }

    /// Status bus listeners subscribe to
    pub fn bus(&self) -> &StatusBus {
        &self.bus
    }

    /// Cached current status
    pub async fn current_status(&self) -> VibeStatus {
        self.bus.current().await
    }

    /// Run one evaluation cycle for a context update
    ///
    /// With no upcoming events the classifier is skipped and the cycle
    /// yields SYNCED. An emitted status carries the update's track as
    /// `now_playing` and replaces the cached status; a suppressed one
    /// leaves the cache untouched.
    pub async fn handle_context(&self, update: ContextUpdate) -> Evaluation {
        let ContextUpdate {
            track,
            events,
            recent_tracks,
        } = update;
        info!(
            "Received context: {} by {} ({} upcoming events)",
            track.name,
            track.artist,
            events.len()
        );

        let judgment = if events.is_empty() {
            debug!("No upcoming events, skipping classifier");
            no_events_judgment()
        } else {
            self.gateway.evaluate(&track, &events, &recent_tracks).await
        };

        let mut evaluator = self.evaluator.lock().await;
        match evaluator.evaluate(judgment, &events) {
            Evaluation::Emit(status) => {
                let status = status.with_now_playing(track);
                let listeners = self.bus.publish(status.clone()).await;
                info!(
                    status = status.kind(),
                    score = status.compatibility_score(),
                    listeners,
                    "Published status"
                );
                Evaluation::Emit(status)
            }
            Evaluation::Suppressed => Evaluation::Suppressed,
        }
    }

    /// Handle the idle signal: nothing is playing
    ///
    /// Also forgets the last mismatch, so the next one after idle is
    /// always emitted.
    pub async fn handle_idle(&self) -> VibeStatus {
        let mut evaluator = self.evaluator.lock().await;
        evaluator.reset();

        let status = VibeStatus::no_music();
        let listeners = self.bus.publish(status.clone()).await;
        info!(listeners, "Published IDLE status");
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::tests::ScriptedOracle;
    use std::time::Duration;
    use vibesync_common::events::{CalendarEvent, MusicContext};

    const MISMATCH_REPLY: &str = r#"{"music_mood": "energizing party music",
        "task_intent": "deep-focus academic work", "compatibility_score": 25,
        "transition_suggestion": "Switch to lo-fi", "song_recommendations": []}"#;

    fn session(oracle: ScriptedOracle) -> (SessionBroadcaster, Arc<ScriptedOracle>) {
        let oracle = Arc::new(oracle);
        let gateway = ClassifierGateway::new(oracle.clone(), Duration::from_secs(5));
        let session = SessionBroadcaster::new(gateway, AlertEvaluator::default(), StatusBus::new(16));
        (session, oracle)
    }

    fn update(events: Vec<CalendarEvent>) -> ContextUpdate {
        ContextUpdate {
            track: MusicContext {
                name: "Blinding Lights".to_string(),
                artist: "The Weeknd".to_string(),
                album: "After Hours".to_string(),
                album_art_url: None,
                artist_genres: Vec::new(),
                popularity: 92,
                audio_features: None,
            },
            events,
            recent_tracks: Vec::new(),
        }
    }

    fn lecture() -> CalendarEvent {
        CalendarEvent {
            summary: "CS 531 Lecture".to_string(),
            description: String::new(),
            start_time: String::new(),
            minutes_until: 45,
            location: String::new(),
        }
    }

    #[tokio::test]
    async fn test_mismatch_published_with_now_playing() {
        let (session, _) = session(ScriptedOracle::replying(MISMATCH_REPLY));
        let (_, mut rx) = session.bus().snapshot_and_subscribe().await;

        let evaluation = session.handle_context(update(vec![lecture()])).await;

        let status = evaluation.into_status().expect("should emit");
        match &status {
            VibeStatus::Mismatch { now_playing, .. } => {
                assert_eq!(now_playing.as_ref().unwrap().name, "Blinding Lights")
            }
            other => panic!("expected VIBE_MISMATCH, got {}", other.kind()),
        }
        assert_eq!(rx.recv().await.unwrap(), status);
        assert_eq!(session.current_status().await, status);
    }

    #[tokio::test]
    async fn test_duplicate_mismatch_keeps_cached_status() {
        let (session, _) = session(ScriptedOracle::replying(MISMATCH_REPLY));

        let first = session.handle_context(update(vec![lecture()])).await;
        let cached = session.current_status().await;
        let second = session.handle_context(update(vec![lecture()])).await;

        assert!(!first.is_suppressed());
        assert!(second.is_suppressed());
        assert_eq!(session.current_status().await, cached);
    }

    #[tokio::test]
    async fn test_no_events_skips_classifier() {
        let (session, oracle) = session(ScriptedOracle::replying(MISMATCH_REPLY));

        let status = session
            .handle_context(update(Vec::new()))
            .await
            .into_status()
            .unwrap();

        match status {
            VibeStatus::Synced {
                compatibility_score,
                music_mood,
                task_intent,
                ..
            } => {
                assert_eq!(compatibility_score, 100);
                assert_eq!(music_mood, "N/A");
                assert_eq!(task_intent, "No upcoming events");
            }
            other => panic!("expected SYNCED, got {}", other.kind()),
        }
        assert!(oracle.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_idle_publishes_and_resets_dedup() {
        let (session, _) = session(ScriptedOracle::replying(MISMATCH_REPLY));

        assert!(!session.handle_context(update(vec![lecture()])).await.is_suppressed());
        assert_eq!(session.handle_idle().await, VibeStatus::no_music());
        assert_eq!(session.current_status().await, VibeStatus::no_music());

        // Same mismatch after idle is emitted again
        assert!(!session.handle_context(update(vec![lecture()])).await.is_suppressed());
    }

    #[tokio::test]
    async fn test_classifier_failure_reads_as_synced() {
        let (session, _) = session(ScriptedOracle::failing("connection reset"));

        let status = session
            .handle_context(update(vec![lecture()]))
            .await
            .into_status()
            .unwrap();

        assert_eq!(status.kind(), "SYNCED");
        assert_eq!(status.compatibility_score(), Some(100));
    }

    #[tokio::test]
    async fn test_concurrent_identical_mismatches_emit_once() {
        let (session, _) = session(ScriptedOracle::replying(MISMATCH_REPLY));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let session = session.clone();
                tokio::spawn(async move { session.handle_context(update(vec![lecture()])).await })
            })
            .collect();

        let mut emitted = 0;
        for handle in handles {
            if !handle.await.unwrap().is_suppressed() {
                emitted += 1;
            }
        }
        assert_eq!(emitted, 1);
    }
}
