//! Session engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default sweep cadence in seconds.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 5;

fn default_sweep_interval() -> u64 {
    DEFAULT_SWEEP_INTERVAL_SECS
}

/// Tunables for the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle timeout in seconds. `None` or `0` disables expiry entirely.
    #[serde(default)]
    pub timeout: Option<u64>,

    /// How often the sweeper scans for idle sessions.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

impl SessionConfig {
    /// Config with the given idle timeout and the default sweep cadence.
    pub fn with_timeout(timeout_secs: u64) -> Self {
        Self {
            timeout: Some(timeout_secs),
            ..Self::default()
        }
    }

    /// Effective idle timeout, or `None` when expiry is disabled.
    pub fn idle_timeout(&self) -> Option<u64> {
        self.timeout.filter(|t| *t > 0)
    }

    /// Sweep interval as a `Duration`. Never zero.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}
