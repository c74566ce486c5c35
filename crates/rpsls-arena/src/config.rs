//! Service configuration from the environment.

use chrono::Duration;
use std::str::FromStr;

const DEFAULT_PORT: u16 = 3000;
/// Five minutes
const DEFAULT_TIMEOUT_SECS: u32 = 300;
const DEFAULT_MAX_TIMEOUT_SECS: u32 = 86_400;

/// Runtime settings, read once at startup
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    pub port: u16,
    /// Applied to games created without an explicit timeout
    pub default_timeout: Duration,
    /// Largest timeout a game may request
    pub max_timeout: Duration,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            default_timeout: Duration::seconds(DEFAULT_TIMEOUT_SECS.into()),
            max_timeout: Duration::seconds(DEFAULT_MAX_TIMEOUT_SECS.into()),
        }
    }
}

impl ArenaConfig {
    /// Read `PORT`, `GAME_TIMEOUT_SECS` and `MAX_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT);
        let max_secs = parse_or(&lookup, "MAX_TIMEOUT_SECS", DEFAULT_MAX_TIMEOUT_SECS);
        let mut default_secs = parse_or(&lookup, "GAME_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
        if default_secs > max_secs {
            tracing::warn!(
                "GAME_TIMEOUT_SECS={} exceeds MAX_TIMEOUT_SECS={}, capping",
                default_secs,
                max_secs
            );
            default_secs = max_secs;
        }

        Self {
            port,
            default_timeout: Duration::seconds(default_secs.into()),
            max_timeout: Duration::seconds(max_secs.into()),
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {}={:?}, using default", key, raw);
            default
        }),
        None => default,
    }
}
