use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::AuthorSummary;
use crate::error::RepoError;

/// Profile store - batched author lookup.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch summaries for every id in one round trip.
    /// Unknown ids are simply absent from the returned map.
    async fn get_profiles(
        &self,
        ids: &HashSet<Uuid>,
    ) -> Result<HashMap<Uuid, AuthorSummary>, RepoError>;
}
