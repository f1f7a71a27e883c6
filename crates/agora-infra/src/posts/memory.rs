//! In-memory post store - ranking source and counter store over one map.
//! Data is lost on process restart.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use agora_core::domain::{
    CounterField, CounterUpdate, FeedFilter, Post, PostCounters, RankRequest,
};
use agora_core::error::RepoError;
use agora_core::ports::{CounterStore, RankingSource};

/// In-memory post table.
///
/// Ranks candidates with a simple built-in strategy and applies counter
/// updates under the write lock, so concurrent updates never interleave.
/// The viewer is ignored: rankings are not personalized.
pub struct InMemoryPostStore {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_posts(posts: impl IntoIterator<Item = Post>) -> Self {
        Self {
            posts: RwLock::new(posts.into_iter().map(|p| (p.id, p)).collect()),
        }
    }

    pub async fn insert(&self, post: Post) {
        self.posts.write().await.insert(post.id, post);
    }

    pub async fn get(&self, id: Uuid) -> Option<Post> {
        self.posts.read().await.get(&id).cloned()
    }
}

impl Default for InMemoryPostStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Score a post for the given filter. Higher ranks first.
fn score(post: &Post, filter: FeedFilter, now: DateTime<Utc>) -> f64 {
    let c = &post.counters;
    match filter {
        FeedFilter::Latest => post.created_at.timestamp() as f64,
        FeedFilter::Popular => (c.likes + c.comments * 2 + c.reposts) as f64,
        FeedFilter::Trending | FeedFilter::Media => {
            // Whole hours keep the score stable between nearby requests.
            let age_hours = (now - post.created_at).num_hours().max(0) as f64;
            let time_score = 1.0 / (1.0 + age_hours / 24.0);
            let engagement = (c.likes + c.comments * 2).max(0) as f64;
            time_score * (1.0 + (1.0 + engagement).ln())
        }
    }
}

/// Total order: score desc, then newest first, then id.
fn ranked_order(a: &Post, b: &Post) -> Ordering {
    b.ranking_score
        .total_cmp(&a.ranking_score)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl RankingSource for InMemoryPostStore {
    async fn rank(&self, request: &RankRequest) -> Result<Vec<Post>, RepoError> {
        let now = Utc::now();
        let since = now - request.timeframe.window();

        let posts = self.posts.read().await;
        let mut candidates: Vec<Post> = posts
            .values()
            .filter(|p| p.created_at >= since)
            .filter(|p| request.filter != FeedFilter::Media || p.has_media())
            .filter(|p| {
                request
                    .category
                    .as_deref()
                    .is_none_or(|category| p.in_category(category))
            })
            .cloned()
            .map(|mut p| {
                p.ranking_score = score(&p, request.filter, now);
                p
            })
            .collect();
        drop(posts);

        candidates.sort_by(ranked_order);

        Ok(candidates
            .into_iter()
            .skip(usize::try_from(request.offset).unwrap_or(usize::MAX))
            .take(request.limit as usize)
            .collect())
    }
}

#[async_trait]
impl CounterStore for InMemoryPostStore {
    async fn apply(&self, post_id: Uuid, update: CounterUpdate) -> Result<PostCounters, RepoError> {
        let mut posts = self.posts.write().await;
        let post = posts.get_mut(&post_id).ok_or(RepoError::NotFound)?;
        let counters = &mut post.counters;

        match update {
            CounterUpdate::Increment { field, by } => match field {
                CounterField::Views => counters.views += by,
                CounterField::Saves => counters.saves += by,
                CounterField::AvgViewTime => counters.avg_view_time_seconds += by as f64,
            },
            CounterUpdate::Set { field, value } => match field {
                CounterField::Views => counters.views = value as i64,
                CounterField::Saves => counters.saves = value as i64,
                CounterField::AvgViewTime => counters.avg_view_time_seconds = value,
            },
        }

        Ok(counters.clone())
    }
}
