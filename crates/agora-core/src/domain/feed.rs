//! Feed query descriptors and the page value returned to callers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuthorSummary, Post};
use crate::error::DomainError;

/// Page size used when the caller does not provide one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Candidate selection mode handed to the ranking source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedFilter {
    #[default]
    Trending,
    Latest,
    Popular,
    Media,
}

impl FeedFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedFilter::Trending => "trending",
            FeedFilter::Latest => "latest",
            FeedFilter::Popular => "popular",
            FeedFilter::Media => "media",
        }
    }
}

impl fmt::Display for FeedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "trending" => Ok(FeedFilter::Trending),
            "latest" => Ok(FeedFilter::Latest),
            "popular" => Ok(FeedFilter::Popular),
            "media" => Ok(FeedFilter::Media),
            other => Err(DomainError::InvalidQuery(format!(
                "unknown filter '{other}'"
            ))),
        }
    }
}

/// Time window over which candidates are considered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "24h")]
    Day,
    #[default]
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Day => "24h",
            Timeframe::Week => "7d",
            Timeframe::Month => "30d",
        }
    }

    /// Length of the window, counted back from now.
    pub fn window(&self) -> chrono::Duration {
        match self {
            Timeframe::Day => chrono::Duration::hours(24),
            Timeframe::Week => chrono::Duration::days(7),
            Timeframe::Month => chrono::Duration::days(30),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "24h" => Ok(Timeframe::Day),
            "7d" => Ok(Timeframe::Week),
            "30d" => Ok(Timeframe::Month),
            other => Err(DomainError::InvalidQuery(format!(
                "unknown timeframe '{other}' (expected 24h, 7d or 30d)"
            ))),
        }
    }
}

/// Feed request as received from a caller, before validation.
///
/// Page and limit stay signed so that out-of-range input can be rejected
/// with a proper error instead of failing at deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub viewer: Option<Uuid>,
    pub filter: String,
    pub category: Option<String>,
    pub timeframe: String,
    pub page: i64,
    pub limit: i64,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            viewer: None,
            filter: FeedFilter::default().as_str().to_string(),
            category: None,
            timeframe: Timeframe::default().as_str().to_string(),
            page: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FeedQuery {
    pub fn page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn timeframe(mut self, timeframe: impl Into<String>) -> Self {
        self.timeframe = timeframe.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn viewer(mut self, viewer: Uuid) -> Self {
        self.viewer = Some(viewer);
        self
    }

    /// Validate the raw query and turn it into a ranking request for one page.
    pub fn validate(&self, max_page_size: u32) -> Result<RankRequest, DomainError> {
        if self.page < 0 {
            return Err(DomainError::InvalidQuery(format!(
                "page must be >= 0, got {}",
                self.page
            )));
        }
        if self.limit <= 0 {
            return Err(DomainError::InvalidQuery(format!(
                "limit must be > 0, got {}",
                self.limit
            )));
        }
        if self.limit > i64::from(max_page_size) {
            return Err(DomainError::InvalidQuery(format!(
                "limit must be <= {max_page_size}, got {}",
                self.limit
            )));
        }

        let filter: FeedFilter = self.filter.parse()?;
        let timeframe: Timeframe = self.timeframe.parse()?;

        // limit is bounded by max_page_size above, so both conversions hold.
        let limit = self.limit as u32;
        let page = self.page as u64;
        let offset = page.checked_mul(u64::from(limit)).ok_or_else(|| {
            DomainError::InvalidQuery(format!("page {page} is out of range"))
        })?;

        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from);

        Ok(RankRequest {
            viewer: self.viewer,
            filter,
            category,
            timeframe,
            page,
            limit,
            offset,
        })
    }
}

/// Validated request handed to a ranking source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankRequest {
    /// Absent for anonymous, non-personalized ranking.
    pub viewer: Option<Uuid>,
    pub filter: FeedFilter,
    pub category: Option<String>,
    pub timeframe: Timeframe,
    pub page: u64,
    /// Number of posts to return.
    pub limit: u32,
    /// Number of ranked posts to skip.
    pub offset: u64,
}

/// A post paired with its author, if the author could be resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub post: Post,
    /// `None` for deleted or inconsistent accounts; render as an unknown user.
    pub author: Option<AuthorSummary>,
}

/// Pagination descriptor attached to every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u32,
    pub offset: u64,
    pub has_more: bool,
}

/// One request-scoped page of the explore feed. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPage {
    pub entries: Vec<FeedEntry>,
    pub pagination: Pagination,
}

impl FeedPage {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn post_ids(&self) -> Vec<Uuid> {
        self.entries.iter().map(|e| e.post.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_route() {
        let request = FeedQuery::default().validate(100).unwrap();
        assert_eq!(request.filter, FeedFilter::Trending);
        assert_eq!(request.timeframe, Timeframe::Week);
        assert_eq!(request.limit, 20);
        assert_eq!(request.offset, 0);
    }

    #[test]
    fn test_offset_is_page_times_limit() {
        let request = FeedQuery::default().page(3).limit(15).validate(100).unwrap();
        assert_eq!(request.offset, 45);
        assert_eq!(request.page, 3);
    }

    #[test]
    fn test_rejects_out_of_range_paging() {
        for query in [
            FeedQuery::default().page(-1),
            FeedQuery::default().limit(0),
            FeedQuery::default().limit(-5),
            FeedQuery::default().limit(101),
        ] {
            assert!(matches!(
                query.validate(100),
                Err(DomainError::InvalidQuery(_))
            ));
        }
    }

    #[test]
    fn test_rejects_unknown_timeframe_and_filter() {
        assert!(matches!(
            FeedQuery::default().timeframe("1y").validate(100),
            Err(DomainError::InvalidQuery(_))
        ));
        assert!(matches!(
            FeedQuery::default().filter("random").validate(100),
            Err(DomainError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_blank_category_is_treated_as_absent() {
        let request = FeedQuery::default().category("  ").validate(100).unwrap();
        assert_eq!(request.category, None);
    }

    #[test]
    fn test_timeframe_windows() {
        assert_eq!(Timeframe::Day.window(), chrono::Duration::hours(24));
        assert_eq!(Timeframe::Month.window(), chrono::Duration::days(30));
        assert_eq!("30d".parse::<Timeframe>().unwrap(), Timeframe::Month);
    }
}
