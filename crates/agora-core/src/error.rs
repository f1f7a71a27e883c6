//! Domain-level error types.

use thiserror::Error;
use uuid::Uuid;

/// Domain errors - business logic failures surfaced to callers.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid metric: {0}")]
    InvalidMetric(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Post not found: {id}")]
    PostNotFound { id: Uuid },

    #[error("Aggregation failed: {0}")]
    InternalAggregation(String),
}

impl DomainError {
    /// Whether the caller may retry the same request with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::UpstreamUnavailable(_))
    }
}

/// Repository-level errors, returned by port implementations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Backend connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),
}
