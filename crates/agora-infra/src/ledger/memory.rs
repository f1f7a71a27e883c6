//! In-memory view ledger.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use agora_core::error::RepoError;
use agora_core::ports::ViewLedger;

struct SessionViews {
    posts: HashSet<Uuid>,
    last_seen: Instant,
}

/// Per-session view sets held in process memory.
///
/// Sessions that stay idle longer than `idle_ttl` are treated as ended and
/// removed by `sweep_idle`. Not shared between instances.
pub struct InMemoryViewLedger {
    sessions: RwLock<HashMap<String, SessionViews>>,
    idle_ttl: Duration,
}

impl InMemoryViewLedger {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Drop sessions idle for at least `idle_ttl`. Returns how many were removed.
    pub async fn sweep_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, views| views.last_seen.elapsed() < self.idle_ttl);
        before - sessions.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for InMemoryViewLedger {
    fn default() -> Self {
        Self::new(Duration::from_secs(30 * 60))
    }
}

#[async_trait]
impl ViewLedger for InMemoryViewLedger {
    async fn mark_viewed(&self, session_id: &str, post_id: Uuid) -> Result<bool, RepoError> {
        // Single write lock: test and insert cannot interleave.
        let mut sessions = self.sessions.write().await;
        let views = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionViews {
                posts: HashSet::new(),
                last_seen: Instant::now(),
            });
        views.last_seen = Instant::now();
        Ok(views.posts.insert(post_id))
    }

    async fn forget(&self, session_id: &str, post_id: Uuid) -> Result<(), RepoError> {
        let mut sessions = self.sessions.write().await;
        if let Some(views) = sessions.get_mut(session_id) {
            views.posts.remove(&post_id);
        }
        Ok(())
    }

    async fn end_session(&self, session_id: &str) -> Result<(), RepoError> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}
