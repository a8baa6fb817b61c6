//! Counter configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! yields the stock widget: key `counterValue`, a 300 ms pulse, and
//! independent pulse clears.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Storage key the counter value is persisted under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "counterValue";

/// Default pulse length in milliseconds.
pub const DEFAULT_PULSE_MS: u64 = 300;

/// What a refresh does with a pulse clear that is still pending.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PulsePolicy {
    /// Every refresh schedules its own clear; earlier clears still fire.
    #[default]
    Independent,
    /// A refresh cancels the pending clear before scheduling a new one, so the
    /// pulse lasts a full period after the most recent change.
    Restart,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub storage_key: String,
    pub pulse_ms: u64,
    pub pulse_policy: PulsePolicy,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            pulse_ms: DEFAULT_PULSE_MS,
            pulse_policy: PulsePolicy::default(),
        }
    }
}

impl CounterConfig {
    /// Parse a config from JSON text. Missing fields take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a config file. A missing file yields the default config.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn pulse_duration(&self) -> Duration {
        Duration::from_millis(self.pulse_ms)
    }
}
