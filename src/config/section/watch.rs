//! `[watch]` section configuration.
//!
//! ```toml
//! [watch]
//! debounce_ms = 200           # Quiet period before a rebuild starts
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEBOUNCE_RANGE_MS: std::ops::RangeInclusive<u64> = 10..=10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSectionConfig {
    /// Debounce window in milliseconds.
    pub debounce_ms: u64,
}

impl Default for WatchSectionConfig {
    fn default() -> Self {
        Self { debounce_ms: 200 }
    }
}

impl WatchSectionConfig {
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn validate(&self, errors: &mut Vec<String>) {
        if !DEBOUNCE_RANGE_MS.contains(&self.debounce_ms) {
            errors.push(format!(
                "watch.debounce_ms must be between {} and {}, got {}",
                DEBOUNCE_RANGE_MS.start(),
                DEBOUNCE_RANGE_MS.end(),
                self.debounce_ms
            ));
        }
    }
}
