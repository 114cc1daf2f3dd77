//! Classifier gateway
//!
//! Wraps the external text-generation oracle and turns a listening +
//! calendar context into a `Judgment`. The gateway never fails outward:
//! call errors, timeouts, unparseable output and missing fields are all
//! logged and collapsed into `Judgment::fail_open()`, which reads as
//! "fully compatible" so a flaky classifier stays silent instead of
//! raising false alarms.

mod error;
pub mod normalize;
pub mod openai;
pub mod prompt;

pub use error::ClassifierError;
pub use openai::OpenAiOracle;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};
use vibesync_common::events::{CalendarEvent, Judgment, MusicContext, RecentTrack};

/// External text-generation oracle
///
/// Implementations return the raw completion text; the gateway owns
/// prompt construction and response normalization.
#[async_trait]
pub trait CompletionOracle: Send + Sync {
    /// Name for logging
    fn name(&self) -> &'static str;

    async fn complete(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, ClassifierError>;
}

/// Prompt → oracle → normalized judgment, with a fail-open boundary
#[derive(Clone)]
pub struct ClassifierGateway {
    oracle: Arc<dyn CompletionOracle>,
    timeout: Duration,
}

impl ClassifierGateway {
    /// # Arguments
    ///
    /// * `oracle` - Completion backend
    /// * `timeout` - Upper bound on one oracle call; expiry fails open
    pub fn new(oracle: Arc<dyn CompletionOracle>, timeout: Duration) -> Self {
        Self { oracle, timeout }
    }

    /// Judge compatibility, falling back to the fail-open judgment on any error
    pub async fn evaluate(
        &self,
        music: &MusicContext,
        events: &[CalendarEvent],
        recent_tracks: &[RecentTrack],
    ) -> Judgment {
        match self.try_evaluate(music, events, recent_tracks).await {
            Ok(judgment) => judgment,
            Err(e) => {
                error!(oracle = self.oracle.name(), "Classifier gateway error: {}", e);
                Judgment::fail_open()
            }
        }
    }

    /// Judge compatibility, surfacing the failure instead of collapsing it
    pub async fn try_evaluate(
        &self,
        music: &MusicContext,
        events: &[CalendarEvent],
        recent_tracks: &[RecentTrack],
    ) -> Result<Judgment, ClassifierError> {
        let user_prompt = prompt::build_prompt(music, events, recent_tracks);

        let content = tokio::time::timeout(
            self.timeout,
            self.oracle.complete(prompt::SYSTEM_PROMPT, &user_prompt),
        )
        .await
        .map_err(|_| ClassifierError::Timeout(self.timeout))??;

        let judgment = normalize::parse_judgment(&content)?;
        debug!(
            score = judgment.compatibility_score,
            mood = %judgment.music_mood,
            intent = %judgment.task_intent,
            "Classifier judgment"
        );
        Ok(judgment)
    }
}
