//! Profile store implementations.

mod memory;

pub use memory::InMemoryProfileStore;
