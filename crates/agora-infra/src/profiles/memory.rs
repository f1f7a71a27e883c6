use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use agora_core::domain::AuthorSummary;
use agora_core::error::RepoError;
use agora_core::ports::ProfileStore;

/// In-memory profile store.
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<Uuid, AuthorSummary>>,
    batches: AtomicUsize,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            batches: AtomicUsize::new(0),
        }
    }

    pub fn with_profiles(profiles: impl IntoIterator<Item = AuthorSummary>) -> Self {
        Self {
            profiles: RwLock::new(profiles.into_iter().map(|p| (p.id, p)).collect()),
            batches: AtomicUsize::new(0),
        }
    }

    pub async fn insert(&self, profile: AuthorSummary) {
        self.profiles.write().await.insert(profile.id, profile);
    }

    /// Number of batched lookups served so far.
    pub fn batch_count(&self) -> usize {
        self.batches.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get_profiles(
        &self,
        ids: &HashSet<Uuid>,
    ) -> Result<HashMap<Uuid, AuthorSummary>, RepoError> {
        self.batches.fetch_add(1, Ordering::Relaxed);
        let profiles = self.profiles.read().await;

        Ok(ids
            .iter()
            .filter_map(|id| profiles.get(id).map(|p| (*id, p.clone())))
            .collect())
    }
}
