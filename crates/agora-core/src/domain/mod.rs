//! Domain entities - the core business objects.

mod author;
mod engagement;
mod feed;
mod post;

pub use author::AuthorSummary;
pub use engagement::{
    CounterField, CounterUpdate, EngagementEvent, EngagementOutcome, MetricKind,
};
pub use feed::{
    DEFAULT_PAGE_SIZE, FeedEntry, FeedFilter, FeedPage, FeedQuery, Pagination, RankRequest,
    Timeframe,
};
pub use post::{Post, PostCounters};
