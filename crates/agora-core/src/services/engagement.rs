//! Engagement recorder.

use std::sync::Arc;
use std::time::Duration;

use super::{DEFAULT_UPSTREAM_TIMEOUT, bounded};
use crate::domain::{EngagementEvent, EngagementOutcome, MetricKind};
use crate::error::{DomainError, RepoError};
use crate::ports::{CounterStore, ViewLedger};

/// Folds engagement events into post counters.
///
/// Views are counted at most once per (post, session). The ledger lives only
/// as long as the serving node, so a session spread across several instances
/// may count a view once per instance.
pub struct EngagementRecorder {
    counters: Arc<dyn CounterStore>,
    ledger: Arc<dyn ViewLedger>,
    timeout: Duration,
}

impl EngagementRecorder {
    pub fn new(counters: Arc<dyn CounterStore>, ledger: Arc<dyn ViewLedger>) -> Self {
        Self {
            counters,
            ledger,
            timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Record one engagement event.
    ///
    /// Invalid events are rejected before any store is touched. A repeated
    /// view for the same session is a silent no-op.
    #[tracing::instrument(
        skip(self, event),
        fields(post_id = %event.post_id, metric = %event.kind)
    )]
    pub async fn record(&self, event: &EngagementEvent) -> Result<EngagementOutcome, DomainError> {
        let update = event.validate()?;
        let is_view = event.kind == MetricKind::View;

        if is_view {
            if event.session_id.trim().is_empty() {
                return Err(DomainError::InvalidMetric(
                    "view requires a client session id".to_string(),
                ));
            }

            let first = bounded(
                self.timeout,
                self.ledger.mark_viewed(&event.session_id, event.post_id),
            )
            .await
            .map_err(|e| DomainError::UpstreamUnavailable(format!("view ledger: {e}")))?;

            if !first {
                tracing::debug!("View already counted for session");
                return Ok(EngagementOutcome::AlreadyCounted);
            }
        }

        match bounded(self.timeout, self.counters.apply(event.post_id, update)).await {
            Ok(counters) => {
                tracing::debug!(field = update.field().column(), "Counter updated");
                Ok(EngagementOutcome::Applied(counters))
            }
            Err(err) => {
                if is_view && write_not_applied(&err) {
                    // Let a later delivery count the view.
                    let forget = self.ledger.forget(&event.session_id, event.post_id);
                    if let Err(e) = bounded(self.timeout, forget).await {
                        tracing::warn!(error = %e, "Failed to roll back view ledger entry");
                    }
                } else if is_view {
                    tracing::warn!(error = %err, "View outcome unknown, keeping ledger entry");
                }
                Err(match err {
                    RepoError::NotFound => DomainError::PostNotFound { id: event.post_id },
                    other => DomainError::UpstreamUnavailable(format!("counter store: {other}")),
                })
            }
        }
    }

    /// Forget every view recorded for a finished session.
    pub async fn end_session(&self, session_id: &str) -> Result<(), DomainError> {
        bounded(self.timeout, self.ledger.end_session(session_id))
            .await
            .map_err(|e| DomainError::UpstreamUnavailable(format!("view ledger: {e}")))?;
        tracing::debug!(session_id, "View session ended");
        Ok(())
    }
}

/// Whether the store is known not to have written anything. A timeout or a
/// query failure may have committed before the error surfaced.
fn write_not_applied(err: &RepoError) -> bool {
    matches!(err, RepoError::NotFound | RepoError::Connection(_))
}
