//! Post stores - ranking source and counter store implementations.

mod memory;

pub use memory::InMemoryPostStore;
