//! Lock coordinator configuration
//!
//! The key namespace and default TTL are injected at construction
//! rather than compiled in, so hosts can load them from their
//! configuration layer alongside everything else.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use tranca_common::{TrancaError, is_valid_key, parse_duration};

/// Key prefix applied when none is configured
pub const DEFAULT_KEY_PREFIX: &str = "tranca:lock:";

/// Lease TTL in seconds applied when none is configured
pub const DEFAULT_TTL_SECS: u64 = 30;

/// Configuration for the lock coordinator
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LockSettings {
    /// Prefix applied to every lock key before it reaches the store,
    /// keeping lock keys disjoint from unrelated store keys
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Lease TTL applied when an operation does not pass one
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL_SECS
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            default_ttl_secs: DEFAULT_TTL_SECS,
        }
    }
}

impl LockSettings {
    /// Build settings from a duration string such as `"30s"` or `"2m"`
    ///
    /// Sub-second durations round down to zero and are rejected.
    pub fn with_ttl_str(key_prefix: impl Into<String>, ttl: &str) -> Result<Self, TrancaError> {
        let ttl = parse_duration(ttl)
            .ok_or_else(|| TrancaError::IllegalArgument(format!("unparseable ttl '{ttl}'")))?;
        let settings = Self {
            key_prefix: key_prefix.into(),
            default_ttl_secs: ttl.as_secs(),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    pub fn validate(&self) -> Result<(), TrancaError> {
        if self.default_ttl_secs == 0 {
            return Err(TrancaError::IllegalArgument(
                "default_ttl_secs must be positive".to_string(),
            ));
        }
        if !self.key_prefix.is_empty() && !is_valid_key(&self.key_prefix) {
            return Err(TrancaError::IllegalArgument(format!(
                "invalid key prefix '{}'",
                self.key_prefix
            )));
        }
        Ok(())
    }
}
