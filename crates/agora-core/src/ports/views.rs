//! View ledger port - per-session view de-duplication.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::RepoError;

/// Session-scoped record of which posts already had a view counted.
///
/// Durability is not required: losing the ledger only risks counting a
/// view once more.
#[async_trait]
pub trait ViewLedger: Send + Sync {
    /// Record a view for the pair. Returns `true` only for the first call
    /// per (session, post); the check and the insert are atomic.
    async fn mark_viewed(&self, session_id: &str, post_id: Uuid) -> Result<bool, RepoError>;

    /// Undo a `mark_viewed`, used when the counter update failed.
    async fn forget(&self, session_id: &str, post_id: Uuid) -> Result<(), RepoError>;

    /// Drop everything recorded for the session.
    async fn end_session(&self, session_id: &str) -> Result<(), RepoError>;
}
