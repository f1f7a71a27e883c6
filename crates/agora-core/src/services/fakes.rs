//! Hand-written port fakes shared by the service tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AuthorSummary, CounterField, CounterUpdate, Post, PostCounters, RankRequest};
use crate::error::RepoError;
use crate::ports::{CounterStore, ProfileStore, RankingSource, ViewLedger};

pub fn author(username: &str) -> AuthorSummary {
    AuthorSummary {
        id: Uuid::new_v4(),
        username: username.to_string(),
        full_name: None,
        avatar_url: None,
    }
}

pub fn post_by(author_id: Uuid) -> Post {
    Post::new(author_id, "hello")
}

/// Serves slices of a fixed, already-ordered candidate list.
pub struct FakeRanking {
    posts: Vec<Post>,
    fail: bool,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last: Mutex<Option<RankRequest>>,
}

impl FakeRanking {
    pub fn new(posts: Vec<Post>) -> Self {
        Self {
            posts,
            fail: false,
            delay: None,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(vec![])
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<RankRequest> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl RankingSource for FakeRanking {
    async fn rank(&self, request: &RankRequest) -> Result<Vec<Post>, RepoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(RepoError::Connection("ranking offline".to_string()));
        }

        Ok(self
            .posts
            .iter()
            .skip(request.offset as usize)
            .take(request.limit as usize)
            .cloned()
            .collect())
    }
}

/// Profile map that remembers every batch it was asked for.
pub struct FakeProfiles {
    profiles: Mutex<HashMap<Uuid, AuthorSummary>>,
    fail: bool,
    lookups: Mutex<Vec<HashSet<Uuid>>>,
}

impl FakeProfiles {
    pub fn new(authors: Vec<AuthorSummary>) -> Self {
        Self {
            profiles: Mutex::new(authors.into_iter().map(|a| (a.id, a)).collect()),
            fail: false,
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(vec![])
        }
    }

    /// Store a summary under a key that may not match its id.
    pub fn insert_under(&self, key: Uuid, summary: AuthorSummary) {
        self.profiles.lock().unwrap().insert(key, summary);
    }

    pub fn lookups(&self) -> Vec<HashSet<Uuid>> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileStore for FakeProfiles {
    async fn get_profiles(
        &self,
        ids: &HashSet<Uuid>,
    ) -> Result<HashMap<Uuid, AuthorSummary>, RepoError> {
        self.lookups.lock().unwrap().push(ids.clone());
        if self.fail {
            return Err(RepoError::Query("profiles offline".to_string()));
        }

        let profiles = self.profiles.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| profiles.get(id).map(|p| (*id, p.clone())))
            .collect())
    }
}

/// Counter map; a post must be registered before it can be updated.
#[derive(Default)]
pub struct FakeCounters {
    counters: Mutex<HashMap<Uuid, PostCounters>>,
    fail: bool,
    stall: Option<Duration>,
    applied: AtomicUsize,
}

impl FakeCounters {
    pub fn with_posts(ids: &[Uuid]) -> Self {
        Self {
            counters: Mutex::new(ids.iter().map(|id| (*id, PostCounters::default())).collect()),
            ..Self::default()
        }
    }

    pub fn failing(ids: &[Uuid]) -> Self {
        Self {
            fail: true,
            ..Self::with_posts(ids)
        }
    }

    /// Writes, then hangs before answering.
    pub fn stalling(ids: &[Uuid], stall: Duration) -> Self {
        Self {
            stall: Some(stall),
            ..Self::with_posts(ids)
        }
    }

    pub fn get(&self, id: Uuid) -> PostCounters {
        self.counters.lock().unwrap().get(&id).cloned().unwrap_or_default()
    }

    pub fn applied(&self) -> usize {
        self.applied.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CounterStore for FakeCounters {
    async fn apply(&self, post_id: Uuid, update: CounterUpdate) -> Result<PostCounters, RepoError> {
        if self.fail {
            return Err(RepoError::Connection("counters offline".to_string()));
        }

        let updated = {
            let mut counters = self.counters.lock().unwrap();
            let entry = counters.get_mut(&post_id).ok_or(RepoError::NotFound)?;
            match update {
                CounterUpdate::Increment { field: CounterField::Views, by } => entry.views += by,
                CounterUpdate::Set { field: CounterField::Saves, value } => {
                    entry.saves = value as i64
                }
                CounterUpdate::Set { field: CounterField::AvgViewTime, value } => {
                    entry.avg_view_time_seconds = value
                }
                other => return Err(RepoError::Query(format!("unsupported update {other:?}"))),
            }
            entry.clone()
        };
        self.applied.fetch_add(1, Ordering::SeqCst);

        if let Some(stall) = self.stall {
            tokio::time::sleep(stall).await;
        }
        Ok(updated)
    }
}

#[derive(Default)]
pub struct FakeLedger {
    seen: Mutex<HashSet<(String, Uuid)>>,
    stall_forget: Option<Duration>,
}

impl FakeLedger {
    /// A ledger whose rollback hangs.
    pub fn stalling_forget(stall: Duration) -> Self {
        Self {
            stall_forget: Some(stall),
            ..Self::default()
        }
    }

    pub fn contains(&self, session_id: &str, post_id: Uuid) -> bool {
        self.seen
            .lock()
            .unwrap()
            .contains(&(session_id.to_string(), post_id))
    }
}

#[async_trait]
impl ViewLedger for FakeLedger {
    async fn mark_viewed(&self, session_id: &str, post_id: Uuid) -> Result<bool, RepoError> {
        Ok(self
            .seen
            .lock()
            .unwrap()
            .insert((session_id.to_string(), post_id)))
    }

    async fn forget(&self, session_id: &str, post_id: Uuid) -> Result<(), RepoError> {
        if let Some(stall) = self.stall_forget {
            tokio::time::sleep(stall).await;
        }
        self.seen
            .lock()
            .unwrap()
            .remove(&(session_id.to_string(), post_id));
        Ok(())
    }

    async fn end_session(&self, session_id: &str) -> Result<(), RepoError> {
        self.seen.lock().unwrap().retain(|(s, _)| s != session_id);
        Ok(())
    }
}
