//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query string of `GET /api/explore`.
///
/// Everything arrives as text so malformed values can be answered with the
/// standard error envelope instead of a framework rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedParams {
    pub user_id: Option<String>,
    pub filter: Option<String>,
    pub category: Option<String>,
    pub timeframe: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Body of `POST /api/explore/engagement`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngagementRequest {
    pub post_id: Option<String>,
    pub metric_type: Option<String>,
    pub value: Option<serde_json::Value>,
    /// Client viewing session, used to count each view once.
    pub session_id: Option<String>,
}

/// Author object embedded in a feed post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Post counters as exposed over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountersResponse {
    pub likes_count: i64,
    pub comments_count: i64,
    pub reposts_count: i64,
    pub save_count: i64,
    pub view_count: i64,
    pub avg_view_time_seconds: f64,
}

/// One explore feed item: post columns plus its author (`null` if unknown).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPostResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub media_urls: Vec<String>,
    pub poll_id: Option<Uuid>,
    #[serde(flatten)]
    pub counters: CountersResponse,
    pub ranking_score: f64,
    pub categories: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub user: Option<AuthorResponse>,
}

/// Result of an engagement update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementResponse {
    pub post_id: Uuid,
    pub metric_type: String,
    /// `false` when a repeated view was ignored.
    pub counted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counters: Option<CountersResponse>,
}
