//! Feed query service.
//!
//! Resolves one page of ranked posts, joins author summaries in a single
//! batched lookup, and derives the pagination descriptor.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use super::{DEFAULT_UPSTREAM_TIMEOUT, bounded};
use crate::domain::{AuthorSummary, FeedEntry, FeedPage, FeedQuery, Pagination, Post, RankRequest};
use crate::error::{DomainError, RepoError};
use crate::ports::{ProfileStore, RankingSource};

/// Feed service settings.
#[derive(Debug, Clone)]
pub struct FeedSettings {
    /// Largest page a caller may request.
    pub max_page_size: u32,
    /// Deadline for each ranking or profile call.
    pub upstream_timeout: Duration,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            max_page_size: 100,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }
}

/// Feed query service.
///
/// Page order is exactly the ranking source's order; this service never
/// re-sorts. Cross-page stability is the ranking source's contract.
pub struct FeedService {
    ranking: Arc<dyn RankingSource>,
    profiles: Arc<dyn ProfileStore>,
    settings: FeedSettings,
}

impl FeedService {
    pub fn new(
        ranking: Arc<dyn RankingSource>,
        profiles: Arc<dyn ProfileStore>,
        settings: FeedSettings,
    ) -> Self {
        Self {
            ranking,
            profiles,
            settings,
        }
    }

    pub fn settings(&self) -> &FeedSettings {
        &self.settings
    }

    /// Fetch one page of the explore feed.
    ///
    /// The page is all-or-nothing: any upstream failure fails the request.
    #[tracing::instrument(
        skip(self, query),
        fields(page = query.page, limit = query.limit, filter = %query.filter)
    )]
    pub async fn get_feed_page(&self, query: &FeedQuery) -> Result<FeedPage, DomainError> {
        let request = query.validate(self.settings.max_page_size)?;
        let page_size = request.limit as usize;

        // One extra row tells us whether another page exists.
        let lookahead = RankRequest {
            limit: request.limit.saturating_add(1),
            ..request.clone()
        };

        let ranked = bounded(self.settings.upstream_timeout, self.ranking.rank(&lookahead))
            .await
            .map_err(|e| upstream_error("ranking source", e))?;

        let mut posts = dedup_by_id(ranked);
        let has_more = posts.len() > page_size;
        posts.truncate(page_size);

        let author_ids: HashSet<Uuid> = posts.iter().map(|p| p.author_id).collect();
        let profiles = if author_ids.is_empty() {
            HashMap::new()
        } else {
            bounded(
                self.settings.upstream_timeout,
                self.profiles.get_profiles(&author_ids),
            )
            .await
            .map_err(|e| upstream_error("profile store", e))?
        };

        let entries = join_authors(posts, &profiles)?;

        tracing::debug!(
            returned = entries.len(),
            authors = author_ids.len(),
            has_more,
            "Feed page assembled"
        );

        Ok(FeedPage {
            entries,
            pagination: Pagination {
                page: request.page,
                limit: request.limit,
                offset: request.offset,
                has_more,
            },
        })
    }
}

fn upstream_error(upstream: &'static str, err: RepoError) -> DomainError {
    tracing::error!(upstream, error = %err, "Feed upstream call failed");
    DomainError::UpstreamUnavailable(format!("{upstream}: {err}"))
}

/// Drop repeated post ids, keeping the first occurrence and the original order.
fn dedup_by_id(posts: Vec<Post>) -> Vec<Post> {
    let mut seen = HashSet::with_capacity(posts.len());
    let before = posts.len();
    let unique: Vec<Post> = posts.into_iter().filter(|p| seen.insert(p.id)).collect();

    if unique.len() != before {
        tracing::warn!(
            dropped = before - unique.len(),
            "Ranking source returned duplicate posts"
        );
    }
    unique
}

/// Left-join posts to their authors. Missing authors become `None`.
fn join_authors(
    posts: Vec<Post>,
    profiles: &HashMap<Uuid, AuthorSummary>,
) -> Result<Vec<FeedEntry>, DomainError> {
    posts
        .into_iter()
        .map(|post| {
            let author = match profiles.get(&post.author_id) {
                Some(summary) if summary.id != post.author_id => {
                    return Err(DomainError::InternalAggregation(format!(
                        "profile store returned author {} under key {}",
                        summary.id, post.author_id
                    )));
                }
                Some(summary) => Some(summary.clone()),
                None => {
                    tracing::debug!(post_id = %post.id, author_id = %post.author_id, "Author missing");
                    None
                }
            };
            Ok(FeedEntry { post, author })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::services::fakes::{FakeProfiles, FakeRanking, author, post_by};

    fn service(ranking: Arc<FakeRanking>, profiles: Arc<FakeProfiles>) -> FeedService {
        FeedService::new(ranking, profiles, FeedSettings::default())
    }

    #[tokio::test]
    async fn test_same_query_returns_same_page() {
        let alice = author("alice");
        let posts: Vec<Post> = (0..5).map(|_| post_by(alice.id)).collect();
        let ranking = Arc::new(FakeRanking::new(posts));
        let profiles = Arc::new(FakeProfiles::new(vec![alice]));
        let svc = service(ranking, profiles);

        let query = FeedQuery::default().limit(3);
        let first = svc.get_feed_page(&query).await.unwrap();
        let second = svc.get_feed_page(&query).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.entries.len(), 3);
    }

    #[tokio::test]
    async fn test_preserves_ranking_order_and_drops_duplicates() {
        let alice = author("alice");
        let a = post_by(alice.id);
        let b = post_by(alice.id);
        let ranking = Arc::new(FakeRanking::new(vec![b.clone(), a.clone(), b.clone()]));
        let svc = service(ranking, Arc::new(FakeProfiles::new(vec![alice])));

        let page = svc.get_feed_page(&FeedQuery::default()).await.unwrap();

        assert_eq!(page.post_ids(), vec![b.id, a.id]);
    }

    #[tokio::test]
    async fn test_authors_fetched_in_one_batch() {
        let authors: Vec<AuthorSummary> = ["a", "b", "c"].into_iter().map(author).collect();
        let posts: Vec<Post> = authors
            .iter()
            .cycle()
            .take(9)
            .map(|a| post_by(a.id))
            .collect();
        let profiles = Arc::new(FakeProfiles::new(authors.clone()));
        let svc = service(Arc::new(FakeRanking::new(posts)), profiles.clone());

        svc.get_feed_page(&FeedQuery::default()).await.unwrap();

        let lookups = profiles.lookups();
        assert_eq!(lookups.len(), 1);
        let expected: HashSet<Uuid> = authors.iter().map(|a| a.id).collect();
        assert_eq!(lookups[0], expected);
    }

    #[tokio::test]
    async fn test_missing_author_keeps_post() {
        let alice = author("alice");
        let ghost = Uuid::new_v4();
        let kept = post_by(ghost);
        let ranking = Arc::new(FakeRanking::new(vec![post_by(alice.id), kept.clone()]));
        let svc = service(ranking, Arc::new(FakeProfiles::new(vec![alice.clone()])));

        let page = svc.get_feed_page(&FeedQuery::default()).await.unwrap();

        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.entries[0].author.as_ref(), Some(&alice));
        assert_eq!(page.entries[1].post.id, kept.id);
        assert!(page.entries[1].author.is_none());
    }

    #[tokio::test]
    async fn test_mismatched_profile_is_an_aggregation_error() {
        let alice = author("alice");
        let post = post_by(alice.id);
        let profiles = Arc::new(FakeProfiles::new(vec![]));
        profiles.insert_under(alice.id, author("impostor"));
        let svc = service(Arc::new(FakeRanking::new(vec![post])), profiles);

        let err = svc.get_feed_page(&FeedQuery::default()).await.unwrap_err();
        assert!(matches!(err, DomainError::InternalAggregation(_)));
    }

    #[tokio::test]
    async fn test_has_more_is_exact_at_page_boundary() {
        let alice = author("alice");
        let posts: Vec<Post> = (0..20).map(|_| post_by(alice.id)).collect();
        let svc = service(
            Arc::new(FakeRanking::new(posts)),
            Arc::new(FakeProfiles::new(vec![alice])),
        );

        let first = svc
            .get_feed_page(&FeedQuery::default().page(0).limit(20))
            .await
            .unwrap();
        assert_eq!(first.entries.len(), 20);
        assert!(!first.pagination.has_more);

        let second = svc
            .get_feed_page(&FeedQuery::default().page(1).limit(20))
            .await
            .unwrap();
        assert!(second.is_empty());
        assert!(!second.pagination.has_more);
        assert_eq!(second.pagination.offset, 20);
    }

    #[tokio::test]
    async fn test_has_more_when_candidates_remain() {
        let alice = author("alice");
        let posts: Vec<Post> = (0..21).map(|_| post_by(alice.id)).collect();
        let svc = service(
            Arc::new(FakeRanking::new(posts)),
            Arc::new(FakeProfiles::new(vec![alice])),
        );

        let page = svc.get_feed_page(&FeedQuery::default()).await.unwrap();
        assert_eq!(page.entries.len(), 20);
        assert!(page.pagination.has_more);
    }

    #[tokio::test]
    async fn test_invalid_query_never_reaches_ranking() {
        let ranking = Arc::new(FakeRanking::new(vec![]));
        let svc = service(ranking.clone(), Arc::new(FakeProfiles::new(vec![])));

        for query in [
            FeedQuery::default().page(-1),
            FeedQuery::default().limit(0),
            FeedQuery::default().timeframe("90d"),
        ] {
            let err = svc.get_feed_page(&query).await.unwrap_err();
            assert!(matches!(err, DomainError::InvalidQuery(_)));
        }
        assert_eq!(ranking.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_page_skips_profile_lookup() {
        let profiles = Arc::new(FakeProfiles::new(vec![]));
        let svc = service(Arc::new(FakeRanking::new(vec![])), profiles.clone());

        let page = svc.get_feed_page(&FeedQuery::default()).await.unwrap();
        assert!(page.is_empty());
        assert!(profiles.lookups().is_empty());
    }

    #[tokio::test]
    async fn test_ranking_failure_is_upstream_unavailable() {
        let ranking = Arc::new(FakeRanking::failing());
        let svc = service(ranking, Arc::new(FakeProfiles::new(vec![])));

        let err = svc.get_feed_page(&FeedQuery::default()).await.unwrap_err();
        assert!(matches!(err, DomainError::UpstreamUnavailable(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_profile_failure_fails_whole_page() {
        let alice = author("alice");
        let svc = service(
            Arc::new(FakeRanking::new(vec![post_by(alice.id)])),
            Arc::new(FakeProfiles::failing()),
        );

        let err = svc.get_feed_page(&FeedQuery::default()).await.unwrap_err();
        assert!(matches!(err, DomainError::UpstreamUnavailable(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_ranking_times_out() {
        let ranking = Arc::new(FakeRanking::new(vec![]).with_delay(Duration::from_secs(60)));
        let svc = FeedService::new(
            ranking,
            Arc::new(FakeProfiles::new(vec![])),
            FeedSettings {
                max_page_size: 100,
                upstream_timeout: Duration::from_secs(1),
            },
        );

        let err = svc.get_feed_page(&FeedQuery::default()).await.unwrap_err();
        assert!(matches!(err, DomainError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_request_passes_through_to_ranking() {
        let ranking = Arc::new(FakeRanking::new(vec![]));
        let svc = service(ranking.clone(), Arc::new(FakeProfiles::new(vec![])));
        let viewer = Uuid::new_v4();

        let query = FeedQuery::default()
            .viewer(viewer)
            .filter("media")
            .category("Art")
            .timeframe("24h")
            .page(2)
            .limit(10);
        svc.get_feed_page(&query).await.unwrap();

        let seen = ranking.last_request().unwrap();
        assert_eq!(seen.viewer, Some(viewer));
        assert_eq!(seen.category.as_deref(), Some("Art"));
        assert_eq!(seen.offset, 20);
        assert_eq!(seen.limit, 11);
    }
}
