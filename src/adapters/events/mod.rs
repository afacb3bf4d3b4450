//! Event publisher adapters.
//!
//! Adapters implement the event publishing port for different
//! environments:
//!
//! - `RedisEventPublisher` - Pub/sub fan-out to the realtime gateway
//! - `InMemoryEventBus` - Synchronous, in-process capture for testing

mod in_memory;
mod redis_publisher;

pub use in_memory::InMemoryEventBus;
pub use redis_publisher::RedisEventPublisher;
