//! Configuration loading
//!
//! Resolution priority for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (merged with 1. by the binary's argument parser)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing default config file is not an error; the relay starts on
//! compiled defaults. A config file named explicitly must exist.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_COMPATIBILITY_THRESHOLD: u8 = 60;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_STATUS_CHANNEL_CAPACITY: usize = 100;
pub const DEFAULT_CLASSIFIER_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CLASSIFIER_MODEL: &str = "gpt-4.1";
pub const DEFAULT_CLASSIFIER_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CLASSIFIER_TEMPERATURE: f32 = 0.7;

/// `[logging]` table of the TOML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// tracing filter directive, e.g. "info" or "vibesync_relay=debug"
    pub level: Option<String>,
}

/// `[classifier]` table of the TOML file
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierToml {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub temperature: Option<f32>,
}

impl fmt::Debug for ClassifierToml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierToml")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// TOML config file schema; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub compatibility_threshold: Option<u8>,
    pub status_channel_capacity: Option<usize>,
    pub logging: LoggingConfig,
    pub classifier: ClassifierToml,
}

/// Settings supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub compatibility_threshold: Option<u8>,
    pub log_level: Option<String>,
    pub classifier_url: Option<String>,
    pub classifier_key: Option<String>,
    pub classifier_model: Option<String>,
    pub classifier_timeout_secs: Option<u64>,
}

/// Connection settings for the external classifier
#[derive(Clone, PartialEq)]
pub struct ClassifierConfig {
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`)
    pub base_url: String,
    /// Bearer credential; never logged
    pub api_key: Option<String>,
    pub model: String,
    /// Upper bound on one classifier call, including the HTTP round trip
    pub timeout: Duration,
    pub temperature: f32,
}

impl fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Fully resolved relay configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    /// Scores strictly below this raise a mismatch (when an event is upcoming)
    pub compatibility_threshold: u8,
    pub log_level: String,
    pub status_channel_capacity: usize,
    pub classifier: ClassifierConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            compatibility_threshold: DEFAULT_COMPATIBILITY_THRESHOLD,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            status_channel_capacity: DEFAULT_STATUS_CHANNEL_CAPACITY,
            classifier: ClassifierConfig {
                base_url: DEFAULT_CLASSIFIER_URL.to_string(),
                api_key: None,
                model: DEFAULT_CLASSIFIER_MODEL.to_string(),
                timeout: Duration::from_secs(DEFAULT_CLASSIFIER_TIMEOUT_SECS),
                temperature: DEFAULT_CLASSIFIER_TEMPERATURE,
            },
        }
    }
}

impl RelayConfig {
    /// Load the TOML file and merge it with CLI/env overrides
    ///
    /// `config_path` of `None` means the platform default location, which
    /// may be absent.
    pub fn resolve(overrides: &ConfigOverrides, config_path: Option<&Path>) -> Result<Self> {
        let file = load_toml_config(config_path)?;
        Self::from_sources(file, overrides)
    }

    /// Merge already-loaded sources and validate the result
    pub fn from_sources(file: TomlConfig, overrides: &ConfigOverrides) -> Result<Self> {
        let defaults = RelayConfig::default();
        let classifier = file.classifier;

        let timeout_secs = overrides
            .classifier_timeout_secs
            .or(classifier.timeout_secs)
            .unwrap_or(DEFAULT_CLASSIFIER_TIMEOUT_SECS);

        let config = RelayConfig {
            host: overrides.host.clone().or(file.host).unwrap_or(defaults.host),
            port: overrides.port.or(file.port).unwrap_or(defaults.port),
            compatibility_threshold: overrides
                .compatibility_threshold
                .or(file.compatibility_threshold)
                .unwrap_or(defaults.compatibility_threshold),
            log_level: overrides
                .log_level
                .clone()
                .or(file.logging.level)
                .unwrap_or(defaults.log_level),
            status_channel_capacity: file
                .status_channel_capacity
                .unwrap_or(defaults.status_channel_capacity),
            classifier: ClassifierConfig {
                base_url: overrides
                    .classifier_url
                    .clone()
                    .or(classifier.base_url)
                    .unwrap_or(defaults.classifier.base_url),
                api_key: overrides.classifier_key.clone().or(classifier.api_key),
                model: overrides
                    .classifier_model
                    .clone()
                    .or(classifier.model)
                    .unwrap_or(defaults.classifier.model),
                timeout: Duration::from_secs(timeout_secs),
                temperature: classifier
                    .temperature
                    .unwrap_or(defaults.classifier.temperature),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the relay cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.compatibility_threshold > crate::events::MAX_COMPATIBILITY_SCORE {
            return Err(Error::Config(format!(
                "compatibility_threshold must be within 0-100, got {}",
                self.compatibility_threshold
            )));
        }
        if self.status_channel_capacity == 0 {
            return Err(Error::Config(
                "status_channel_capacity must be at least 1".to_string(),
            ));
        }
        if self.classifier.base_url.trim().is_empty() {
            return Err(Error::Config("classifier base_url is empty".to_string()));
        }
        if self.classifier.timeout.is_zero() {
            return Err(Error::Config(
                "classifier timeout_secs must be at least 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.classifier.temperature) {
            return Err(Error::Config(format!(
                "classifier temperature must be within 0.0-2.0, got {}",
                self.classifier.temperature
            )));
        }
        Ok(())
    }

    /// `host:port` for the listener socket
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Platform config file location: `<config_dir>/vibesync/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("vibesync").join("config.toml"))
}

/// Read the TOML config file
///
/// An explicit path must exist. The default path is optional: when it is
/// missing (or the platform has no config dir) an empty `TomlConfig` is
/// returned.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let path = match path {
        Some(explicit) => {
            if !explicit.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    explicit.display()
                )));
            }
            explicit.to_path_buf()
        }
        None => match default_config_path() {
            Some(default) if default.exists() => default,
            Some(default) => {
                debug!("No config file at {}, using defaults", default.display());
                return Ok(TomlConfig::default());
            }
            None => return Ok(TomlConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path)?;
    let config: TomlConfig = toml::from_str(&content)?;
    info!("Loaded config file {}", path.display());
    Ok(config)
}
