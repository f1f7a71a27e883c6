//! Ranking source port.

use async_trait::async_trait;

use crate::domain::{Post, RankRequest};
use crate::error::RepoError;

/// Orders the candidate set for a request and returns one slice of it.
///
/// Implementations must behave as a stable paginator: for an unchanged data
/// set, consecutive offsets neither repeat nor skip posts. The feed service
/// relies on this and does not re-sort.
#[async_trait]
pub trait RankingSource: Send + Sync {
    /// Return at most `request.limit` posts starting at `request.offset`,
    /// in ranked order.
    async fn rank(&self, request: &RankRequest) -> Result<Vec<Post>, RepoError>;
}
