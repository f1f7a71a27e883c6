//! Application services - the feed query pipeline and the engagement recorder.

mod engagement;
mod feed;

#[cfg(test)]
mod fakes;

use std::future::Future;
use std::time::Duration;

use crate::error::RepoError;

pub use engagement::EngagementRecorder;
pub use feed::{FeedService, FeedSettings};

/// Default deadline for a single upstream call.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Run an upstream call under a deadline. Dropping the returned future
/// cancels the in-flight call.
async fn bounded<T, F>(timeout: Duration, call: F) -> Result<T, RepoError>
where
    F: Future<Output = Result<T, RepoError>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| RepoError::Timeout(timeout))?
}
