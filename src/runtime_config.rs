//! # Runtime Configuration Module
//!
//! Environment-driven settings for the dispatcher.
//!
//! ## Environment Variables
//!
//! ### `QUEST_SLOW_MATCH_US`
//!
//! Route matches that take longer than this many microseconds are logged at
//! WARN instead of INFO. Default: `1000` (1 ms).
//!
//! ### `QUEST_DEFAULT_METHOD`
//!
//! Method called on a deferred handler whose reference names no method
//! (`users` rather than `users#show`). Default: `handle`.
//!
//! ## Usage
//!
//! ```rust
//! use quest_router::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("slow match threshold: {:?}", config.slow_match);
//! ```
//!
//! Unparsable values fall back to the default and are reported at WARN.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::dispatcher::DEFAULT_HANDLER_METHOD;
use crate::router::DEFAULT_SLOW_MATCH;

pub const SLOW_MATCH_ENV: &str = "QUEST_SLOW_MATCH_US";
pub const DEFAULT_METHOD_ENV: &str = "QUEST_DEFAULT_METHOD";

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Matches slower than this are logged at WARN
    pub slow_match: Duration,
    /// Method invoked on deferred handlers that name none
    pub default_method: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            slow_match: DEFAULT_SLOW_MATCH,
            default_method: DEFAULT_HANDLER_METHOD.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let slow_match = match lookup(SLOW_MATCH_ENV) {
            Some(val) => match val.trim().parse::<u64>() {
                Ok(us) => Duration::from_micros(us),
                Err(_) => {
                    warn!(variable = SLOW_MATCH_ENV, value = %val, "Invalid value, using default");
                    defaults.slow_match
                }
            },
            None => defaults.slow_match,
        };

        let default_method = match lookup(DEFAULT_METHOD_ENV) {
            Some(val) if !val.trim().is_empty() => val.trim().to_string(),
            Some(_) => {
                warn!(variable = DEFAULT_METHOD_ENV, "Empty value, using default");
                defaults.default_method
            }
            None => defaults.default_method,
        };

        RuntimeConfig {
            slow_match,
            default_method,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let config = RuntimeConfig::from_lookup(|_| None);
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.slow_match, Duration::from_millis(1));
        assert_eq!(config.default_method, "handle");
    }

    #[test]
    fn values_are_read() {
        let config = RuntimeConfig::from_lookup(|key| match key {
            SLOW_MATCH_ENV => Some("250".into()),
            DEFAULT_METHOD_ENV => Some(" invoke ".into()),
            _ => None,
        });
        assert_eq!(config.slow_match, Duration::from_micros(250));
        assert_eq!(config.default_method, "invoke");
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = RuntimeConfig::from_lookup(|key| match key {
            SLOW_MATCH_ENV => Some("soon".into()),
            DEFAULT_METHOD_ENV => Some("  ".into()),
            _ => None,
        });
        assert_eq!(config, RuntimeConfig::default());
    }
}
