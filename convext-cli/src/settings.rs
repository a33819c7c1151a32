//! Environment configuration

use std::env;
use tracing::Level;

pub const LOG_VAR: &str = "CONVEXT_LOG";
pub const TRACE_VAR: &str = "CONVEXT_TRACE";

/// Settings read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_level: Level,
    /// Include converter traces in responses
    pub trace: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            trace: false,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Unparseable values fall back to the defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let log_level = lookup(LOG_VAR)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.log_level);
        let trace = lookup(TRACE_VAR)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(defaults.trace);
        Self { log_level, trace }
    }
}
