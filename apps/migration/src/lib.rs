//! Schema migrations for the explore feed.

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_explore_tables;
mod m20250101_000002_create_explore_feed_function;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_explore_tables::Migration),
            Box::new(m20250101_000002_create_explore_feed_function::Migration),
        ]
    }
}
