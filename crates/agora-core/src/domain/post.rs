use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Engagement counters carried by a post.
///
/// Views and saves only move forward through this core; likes and reposts
/// are toggled elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostCounters {
    pub likes: i64,
    pub comments: i64,
    pub reposts: i64,
    pub saves: i64,
    pub views: i64,
    pub avg_view_time_seconds: f64,
}

/// Post entity - a candidate for the explore feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub media_urls: Vec<String>,
    pub poll_id: Option<Uuid>,
    pub counters: PostCounters,
    /// Opaque score assigned by the ranking source.
    pub ranking_score: f64,
    pub categories: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post with zeroed counters.
    pub fn new(author_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            content: content.into(),
            media_urls: Vec::new(),
            poll_id: None,
            counters: PostCounters::default(),
            ranking_score: 0.0,
            categories: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn has_media(&self) -> bool {
        !self.media_urls.is_empty()
    }

    pub fn in_category(&self, category: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
    }
}
