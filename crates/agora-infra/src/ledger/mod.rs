//! View ledger implementations - Redis and in-memory fallback.

mod memory;

pub use memory::InMemoryViewLedger;

#[cfg(feature = "redis")]
mod redis;
#[cfg(feature = "redis")]
pub use self::redis::{RedisConfig, RedisViewLedger};
