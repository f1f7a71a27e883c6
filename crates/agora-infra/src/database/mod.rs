//! PostgreSQL adapters via SeaORM.

mod connections;
pub mod entity;
mod postgres_repo;

pub use connections::{DatabaseConfig, DatabaseConnections};
pub use postgres_repo::{PostgresCounterStore, PostgresProfileStore, PostgresRankingSource};

#[cfg(test)]
mod tests;
