//! Expiry sweeper configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Expiry sweeper configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SweeperConfig {
    /// Whether the background sweep loop runs at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Hours between sweep runs
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,
}

impl SweeperConfig {
    /// Get the sweep interval as Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_hours * 3600)
    }

    /// Validate sweeper configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval_hours == 0 || self.interval_hours > 168 {
            return Err(ValidationError::InvalidSweepInterval);
        }
        Ok(())
    }
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_hours: default_interval_hours(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_interval_hours() -> u64 {
    24
}
