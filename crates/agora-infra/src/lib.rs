//! # Agora Infrastructure
//!
//! Concrete implementations of the ports defined in `agora-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL ranking, profile and counter stores via SeaORM
//! - `redis` - Redis-backed view ledger

pub mod ledger;
pub mod posts;
pub mod profiles;

#[cfg(feature = "postgres")]
pub mod database;

// Re-exports - In-Memory
pub use ledger::InMemoryViewLedger;
pub use posts::InMemoryPostStore;
pub use profiles::InMemoryProfileStore;

// Re-exports - PostgreSQL
#[cfg(feature = "postgres")]
pub use database::{
    DatabaseConfig, DatabaseConnections, PostgresCounterStore, PostgresProfileStore,
    PostgresRankingSource,
};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use ledger::{RedisConfig, RedisViewLedger};
