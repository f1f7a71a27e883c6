//! Explore feed handlers.

use actix_web::{HttpRequest, HttpResponse, web};
use uuid::Uuid;

use agora_core::domain::{
    EngagementEvent, EngagementOutcome, FeedEntry, FeedFilter, FeedQuery, MetricKind,
    PostCounters, Timeframe,
};
use agora_shared::dto::{
    AuthorResponse, CountersResponse, EngagementRequest, EngagementResponse, FeedParams,
    FeedPostResponse,
};
use agora_shared::{ApiResponse, PaginationInfo};

use crate::middleware::error::{AppError, AppResult};
use crate::observability::RequestId;
use crate::state::AppState;

/// Header a client may use to identify its viewing session.
pub const SESSION_HEADER: &str = "x-session-id";

/// GET /api/explore
pub async fn get_feed(
    state: web::Data<AppState>,
    params: web::Query<FeedParams>,
) -> AppResult<HttpResponse> {
    let query = feed_query(params.into_inner(), state.default_page_size)?;

    let page = state
        .feed
        .get_feed_page(&query)
        .await
        .map_err(|e| AppError::domain(e, "Failed to fetch explore feed"))?;

    let pagination = PaginationInfo {
        page: page.pagination.page,
        limit: page.pagination.limit,
        offset: page.pagination.offset,
        has_more: page.pagination.has_more,
    };
    let data: Vec<FeedPostResponse> = page.entries.into_iter().map(feed_post).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::paginated(data, pagination)))
}

/// POST /api/explore/engagement
pub async fn record_engagement(
    state: web::Data<AppState>,
    request_id: RequestId,
    req: HttpRequest,
    body: web::Json<EngagementRequest>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();

    let (Some(post_id), Some(metric_type), Some(value)) =
        (body.post_id, body.metric_type, body.value)
    else {
        return Err(AppError::BadRequest(
            "Missing required parameters".to_string(),
        ));
    };

    let post_id = Uuid::parse_str(post_id.trim())
        .map_err(|_| AppError::BadRequest(format!("Invalid post_id '{post_id}'")))?;
    let kind: MetricKind = metric_type.parse()?;
    let value = value
        .as_f64()
        .ok_or_else(|| AppError::BadRequest("value must be a number".to_string()))?;

    let session_id = session_id(body.session_id, &req, &request_id);
    let event = EngagementEvent::new(post_id, kind, value, session_id);

    let outcome = state.engagement.record(&event).await.map_err(|e| {
        // Telemetry signal: log and report, never escalate.
        tracing::warn!(post_id = %post_id, metric = %kind, error = %e, "Engagement not recorded");
        AppError::domain(e, "Failed to update engagement metrics")
    })?;

    let response = match outcome {
        EngagementOutcome::Applied(counters) => EngagementResponse {
            post_id,
            metric_type: kind.to_string(),
            counted: true,
            counters: Some(counters_response(&counters)),
        },
        EngagementOutcome::AlreadyCounted => EngagementResponse {
            post_id,
            metric_type: kind.to_string(),
            counted: false,
            counters: None,
        },
    };

    Ok(HttpResponse::Ok().json(ApiResponse::ok(response)))
}

/// DELETE /api/explore/sessions/{session_id}
pub async fn end_session(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let session_id = path.into_inner();
    state
        .engagement
        .end_session(&session_id)
        .await
        .map_err(|e| AppError::domain(e, "Failed to end session"))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(serde_json::json!({
        "session_id": session_id,
        "ended": true,
    }))))
}

/// Build a feed query from the query string. Absent values take defaults,
/// malformed ones are rejected.
fn feed_query(params: FeedParams, default_page_size: i64) -> AppResult<FeedQuery> {
    let viewer = params
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s).map_err(|_| AppError::BadRequest(format!("Invalid user_id '{s}'")))
        })
        .transpose()?;

    Ok(FeedQuery {
        viewer,
        filter: non_empty(params.filter).unwrap_or_else(|| FeedFilter::default().to_string()),
        category: non_empty(params.category),
        timeframe: non_empty(params.timeframe)
            .unwrap_or_else(|| Timeframe::default().to_string()),
        page: parse_int("page", params.page)?.unwrap_or(0),
        limit: parse_int("limit", params.limit)?.unwrap_or(default_page_size),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_int(name: &str, value: Option<String>) -> AppResult<Option<i64>> {
    non_empty(value)
        .map(|v| {
            v.trim()
                .parse::<i64>()
                .map_err(|_| AppError::BadRequest(format!("{name} must be an integer, got '{v}'")))
        })
        .transpose()
}

/// Pick the session used for view de-duplication.
fn session_id(from_body: Option<String>, req: &HttpRequest, request_id: &RequestId) -> String {
    if let Some(id) = non_empty(from_body) {
        return id;
    }
    if let Some(id) = req
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
    {
        return id.to_string();
    }

    tracing::warn!(
        request_id = request_id.as_str(),
        "No client session supplied, views from this request cannot be de-duplicated"
    );
    format!("request:{}", request_id.as_str())
}

fn counters_response(counters: &PostCounters) -> CountersResponse {
    CountersResponse {
        likes_count: counters.likes,
        comments_count: counters.comments,
        reposts_count: counters.reposts,
        save_count: counters.saves,
        view_count: counters.views,
        avg_view_time_seconds: counters.avg_view_time_seconds,
    }
}

fn feed_post(entry: FeedEntry) -> FeedPostResponse {
    let FeedEntry { post, author } = entry;
    FeedPostResponse {
        id: post.id,
        user_id: post.author_id,
        counters: counters_response(&post.counters),
        content: post.content,
        media_urls: post.media_urls,
        poll_id: post.poll_id,
        ranking_score: post.ranking_score,
        categories: post.categories,
        created_at: post.created_at,
        user: author.map(|a| AuthorResponse {
            id: a.id,
            username: a.username,
            full_name: a.full_name,
            avatar_url: a.avatar_url,
        }),
    }
}
