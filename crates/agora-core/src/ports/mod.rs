//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod counters;
mod profiles;
mod ranking;
mod views;

pub use counters::CounterStore;
pub use profiles::ProfileStore;
pub use ranking::RankingSource;
pub use views::ViewLedger;
