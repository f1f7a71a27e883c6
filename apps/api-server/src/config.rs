//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use agora_core::FeedSettings;
use agora_core::domain::DEFAULT_PAGE_SIZE;

/// Postgres connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseSettings>,
    pub redis_url: Option<String>,
    pub feed: FeedSettings,
    /// Page size used when a request omits `limit`.
    pub default_page_size: i64,
    /// A view session with no activity for this long is considered ended.
    pub view_session_idle: Duration,
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseSettings {
            url,
            max_connections: parse_or("DB_MAX_CONNECTIONS", 100),
            min_connections: parse_or("DB_MIN_CONNECTIONS", 10),
        });

        let defaults = FeedSettings::default();
        let feed = FeedSettings {
            max_page_size: parse_or("FEED_MAX_PAGE_SIZE", defaults.max_page_size).max(1),
            upstream_timeout: Duration::from_secs(parse_or(
                "FEED_UPSTREAM_TIMEOUT_SECS",
                defaults.upstream_timeout.as_secs(),
            )),
        };

        let mut default_page_size = parse_or("FEED_DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE);
        if default_page_size <= 0 || default_page_size > i64::from(feed.max_page_size) {
            tracing::warn!(
                default_page_size,
                max_page_size = feed.max_page_size,
                "FEED_DEFAULT_PAGE_SIZE out of range, clamping"
            );
            default_page_size = default_page_size.clamp(1, i64::from(feed.max_page_size));
        }

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_or("PORT", 8080),
            database,
            redis_url: env::var("REDIS_URL").ok().filter(|u| !u.is_empty()),
            feed,
            default_page_size,
            view_session_idle: Duration::from_secs(parse_or("VIEW_SESSION_IDLE_SECS", 30 * 60)),
        }
    }
}
