//! Command-line arguments for vibesync-relay
//!
//! Every flag can also come from the environment; both are folded into
//! `ConfigOverrides` and sit above the TOML file in priority.

use clap::Parser;
use std::path::PathBuf;
use vibesync_common::config::ConfigOverrides;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "vibesync-relay")]
#[command(about = "Relays listening context to the vibe classifier and broadcasts dashboard status")]
#[command(version)]
pub struct RelayArgs {
    /// TOML config file (default: <config dir>/vibesync/config.toml, optional)
    #[arg(short, long, env = "VIBESYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "VIBESYNC_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "VIBESYNC_PORT")]
    pub port: Option<u16>,

    /// Scores below this raise a mismatch alert (0-100)
    #[arg(short = 't', long, env = "VIBESYNC_COMPATIBILITY_THRESHOLD")]
    pub threshold: Option<u8>,

    /// tracing filter directive (RUST_LOG still wins when set)
    #[arg(long, env = "VIBESYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Base URL of the OpenAI-compatible classifier API
    #[arg(long, env = "VIBESYNC_CLASSIFIER_URL")]
    pub classifier_url: Option<String>,

    /// Classifier API credential
    #[arg(long, env = "VIBESYNC_CLASSIFIER_KEY", hide_env_values = true)]
    pub classifier_key: Option<String>,

    /// Classifier model identifier
    #[arg(long, env = "VIBESYNC_CLASSIFIER_MODEL")]
    pub classifier_model: Option<String>,

    /// Seconds before a classifier call gives up (and fails open)
    #[arg(long, env = "VIBESYNC_CLASSIFIER_TIMEOUT")]
    pub classifier_timeout: Option<u64>,
}

impl RelayArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            compatibility_threshold: self.threshold,
            log_level: self.log_level.clone(),
            classifier_url: self.classifier_url.clone(),
            classifier_key: self.classifier_key.clone(),
            classifier_model: self.classifier_model.clone(),
            classifier_timeout_secs: self.classifier_timeout,
        }
    }
}
