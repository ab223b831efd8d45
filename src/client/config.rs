//! Client configuration
//!
//! Timing and behavior knobs for the emulated backend. Every field has a
//! default, so `{}` is a valid config file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AuthConfig;
use crate::fixtures::is_seeded_email;
use crate::observability::{log_event_with_fields, Event};

/// Configuration errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(String),

    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Artificial latency for queries, sign-in, sign-up and rpc (default: 500)
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,

    /// Delay before a new auth listener's first event (default: 100)
    #[serde(default = "default_listener_delay_ms")]
    pub listener_delay_ms: u64,

    /// Session lifetime in seconds (default: 3600)
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Resolve rpc calls to an `unimplemented` error instead of null data
    #[serde(default)]
    pub rpc_strict: bool,

    /// Seeded account signed in at construction
    #[serde(default)]
    pub initial_user: Option<String>,
}

/// Ten years
const MAX_SESSION_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

fn default_latency_ms() -> u64 {
    500
}

fn default_listener_delay_ms() -> u64 {
    100
}

fn default_session_ttl_secs() -> u64 {
    3600
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            listener_delay_ms: default_listener_delay_ms(),
            session_ttl_secs: default_session_ttl_secs(),
            rpc_strict: false,
            initial_user: None,
        }
    }
}

impl ClientConfig {
    /// No artificial delays
    pub fn instant() -> Self {
        Self {
            latency_ms: 0,
            listener_delay_ms: 0,
            ..Default::default()
        }
    }

    /// Starts signed in as the first demo author
    pub fn demo() -> Self {
        Self {
            initial_user: Some("zhangsan@example.com".to_string()),
            ..Default::default()
        }
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read(e.to_string()))?;

        let config: ClientConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;

        let path = path.display().to_string();
        log_event_with_fields(Event::ConfigLoaded, &[("path", path.as_str())]);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_ttl_secs == 0 || self.session_ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(ConfigError::Invalid(format!(
                "session_ttl_secs must be between 1 and {}",
                MAX_SESSION_TTL_SECS
            )));
        }

        if let Some(email) = &self.initial_user {
            if !is_seeded_email(email) {
                return Err(ConfigError::Invalid(format!(
                    "initial_user '{}' is not a seeded account",
                    email
                )));
            }
        }

        Ok(())
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn listener_delay(&self) -> Duration {
        Duration::from_millis(self.listener_delay_ms)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        let secs = self.session_ttl_secs.min(MAX_SESSION_TTL_SECS);
        chrono::Duration::seconds(secs as i64)
    }

    /// Settings for the auth emulator
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            latency: self.latency(),
            listener_delay: self.listener_delay(),
            session_ttl: self.session_ttl(),
        }
    }
}
