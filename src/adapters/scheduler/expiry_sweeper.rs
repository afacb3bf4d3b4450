//! ExpirySweeper - Background service for the daily expiry sweep.
//!
//! Wraps the sweep handler in a timer loop so lapsed rows converge even
//! when their owners generate no traffic. The first tick fires at boot,
//! which also catches anything that lapsed while the service was down.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `interval` | 24h | How often to run both scans |
//!
//! ## Graceful Shutdown
//!
//! The service listens for a shutdown signal and stops without waiting
//! for the next tick. A sweep already in flight completes first.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::application::handlers::subscription::{SweepExpiredHandler, SweepExpiredResult};
use crate::domain::foundation::DomainError;

/// Configuration for the ExpirySweeper service.
#[derive(Debug, Clone)]
pub struct ExpirySweeperConfig {
    /// How often to run the sweep.
    pub interval: Duration,
}

impl Default for ExpirySweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60 * 60 * 24),
        }
    }
}

impl ExpirySweeperConfig {
    /// Create config with a custom sweep interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Background service that converges lapsed subscription rows.
pub struct ExpirySweeper {
    handler: Arc<SweepExpiredHandler>,
    config: ExpirySweeperConfig,
}

impl ExpirySweeper {
    /// Create a new ExpirySweeper with default configuration.
    pub fn new(handler: Arc<SweepExpiredHandler>) -> Self {
        Self {
            handler,
            config: ExpirySweeperConfig::default(),
        }
    }

    /// Create a new ExpirySweeper with custom configuration.
    pub fn with_config(handler: Arc<SweepExpiredHandler>, config: ExpirySweeperConfig) -> Self {
        Self { handler, config }
    }

    /// Run the sweep loop until a shutdown signal is received.
    ///
    /// A failed sweep is logged and retried on the next tick; the loop
    /// itself only exits on shutdown.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.interval);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        return;
                    }
                }

                _ = interval.tick() => {
                    if let Err(e) = self.handler.handle().await {
                        tracing::error!(error = %e, "Expiry sweep failed");
                    }
                }
            }
        }
    }

    /// Run exactly one sweep (for testing).
    pub async fn poll_once(&self) -> Result<SweepExpiredResult, DomainError> {
        self.handler.handle().await
    }
}
