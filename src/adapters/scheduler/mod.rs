//! Background schedulers.
//!
//! Long-running tasks spawned next to the HTTP server and stopped
//! through the same shutdown channel.

pub mod expiry_sweeper;

pub use expiry_sweeper::{ExpirySweeper, ExpirySweeperConfig};
