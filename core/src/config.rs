//! Runtime configuration. The engine has exactly one external tunable:
//! how often the background reporter fires.

use std::time::Duration;

/// Reporter interval in milliseconds.
pub const REPORT_INTERVAL_ENV: &str = "DIALBOARD_REPORT_INTERVAL_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub report_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            report_interval: Duration::from_millis(1000),
        }
    }
}

impl EngineConfig {
    /// Read configuration from the environment. Unset, unparsable, or
    /// zero values fall back to the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(REPORT_INTERVAL_ENV) {
            match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => config.report_interval = Duration::from_millis(ms),
                _ => log::warn!("ignoring invalid {REPORT_INTERVAL_ENV}={raw}"),
            }
        }
        config
    }
}
