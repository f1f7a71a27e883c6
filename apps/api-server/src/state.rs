//! Application state - shared across all handlers.

use std::sync::Arc;

use agora_core::ports::{CounterStore, ProfileStore, RankingSource, ViewLedger};
use agora_core::{EngagementRecorder, FeedService};
use agora_infra::{InMemoryPostStore, InMemoryProfileStore, InMemoryViewLedger};

use crate::config::AppConfig;

type Stores = (
    Arc<dyn RankingSource>,
    Arc<dyn ProfileStore>,
    Arc<dyn CounterStore>,
);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<FeedService>,
    pub engagement: Arc<EngagementRecorder>,
    /// Set when views are tracked in process memory and need periodic sweeping.
    pub local_ledger: Option<Arc<InMemoryViewLedger>>,
    pub default_page_size: i64,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let (ranking, profiles, counters) = Self::stores(config).await;
        let (ledger, local_ledger) = Self::ledger(config).await;

        tracing::info!("Application state initialized");

        Self::from_parts(config, ranking, profiles, counters, ledger, local_ledger)
    }

    /// Wire services from explicitly constructed store handles.
    pub fn from_parts(
        config: &AppConfig,
        ranking: Arc<dyn RankingSource>,
        profiles: Arc<dyn ProfileStore>,
        counters: Arc<dyn CounterStore>,
        ledger: Arc<dyn ViewLedger>,
        local_ledger: Option<Arc<InMemoryViewLedger>>,
    ) -> Self {
        let feed = FeedService::new(ranking, profiles, config.feed.clone());
        let engagement =
            EngagementRecorder::new(counters, ledger).with_timeout(config.feed.upstream_timeout);

        Self {
            feed: Arc::new(feed),
            engagement: Arc::new(engagement),
            local_ledger,
            default_page_size: config.default_page_size,
        }
    }

    fn in_memory_stores() -> Stores {
        let posts = Arc::new(InMemoryPostStore::new());
        (
            posts.clone(),
            Arc::new(InMemoryProfileStore::new()),
            posts,
        )
    }

    #[cfg(feature = "postgres")]
    async fn stores(config: &AppConfig) -> Stores {
        use agora_infra::{
            DatabaseConfig, DatabaseConnections, PostgresCounterStore, PostgresProfileStore,
            PostgresRankingSource,
        };

        let Some(settings) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Self::in_memory_stores();
        };

        let db_config = DatabaseConfig {
            url: settings.url.clone(),
            max_connections: settings.max_connections,
            min_connections: settings.min_connections,
            connect_timeout: config.feed.upstream_timeout,
        };

        match DatabaseConnections::init(&db_config).await {
            Ok(connections) => (
                Arc::new(PostgresRankingSource::new(connections.main.clone())),
                Arc::new(PostgresProfileStore::new(connections.main.clone())),
                Arc::new(PostgresCounterStore::new(connections.main)),
            ),
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                Self::in_memory_stores()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn stores(_config: &AppConfig) -> Stores {
        tracing::info!("Running without postgres feature - using in-memory stores");
        Self::in_memory_stores()
    }

    fn in_memory_ledger(config: &AppConfig) -> (Arc<dyn ViewLedger>, Option<Arc<InMemoryViewLedger>>) {
        let ledger = Arc::new(InMemoryViewLedger::new(config.view_session_idle));
        (ledger.clone(), Some(ledger))
    }

    #[cfg(feature = "redis")]
    async fn ledger(config: &AppConfig) -> (Arc<dyn ViewLedger>, Option<Arc<InMemoryViewLedger>>) {
        use agora_infra::{RedisConfig, RedisViewLedger};

        let Some(url) = &config.redis_url else {
            tracing::info!("REDIS_URL not set. Tracking views in process memory.");
            return Self::in_memory_ledger(config);
        };

        let redis_config = RedisConfig {
            url: url.clone(),
            session_ttl: config.view_session_idle,
            ..RedisConfig::default()
        };

        match RedisViewLedger::new(redis_config).await {
            Ok(ledger) => (Arc::new(ledger), None),
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable. Tracking views in process memory.");
                Self::in_memory_ledger(config)
            }
        }
    }

    #[cfg(not(feature = "redis"))]
    async fn ledger(config: &AppConfig) -> (Arc<dyn ViewLedger>, Option<Arc<InMemoryViewLedger>>) {
        Self::in_memory_ledger(config)
    }
}
