use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{CounterUpdate, PostCounters};
use crate::error::RepoError;

/// Counter store - atomic per-post counter updates.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Apply the update atomically at the storage layer and return the
    /// post's counters afterwards. Returns `RepoError::NotFound` if the post
    /// does not exist.
    async fn apply(&self, post_id: Uuid, update: CounterUpdate) -> Result<PostCounters, RepoError>;
}
