//! Redis view ledger - one SET per session, expiring after inactivity.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use uuid::Uuid;

use agora_core::error::RepoError;
use agora_core::ports::ViewLedger;

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// A session's view set expires after this much inactivity
    pub session_ttl: Duration,
    /// Prefix for session keys
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            session_ttl: Duration::from_secs(30 * 60),
            key_prefix: "agora:views".to_string(),
        }
    }
}

impl RedisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("REDIS_URL").unwrap_or(defaults.url),
            connect_timeout: std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            session_ttl: std::env::var("VIEW_SESSION_IDLE_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_ttl),
            key_prefix: defaults.key_prefix,
        }
    }
}

/// Redis-backed view ledger.
///
/// Shared by every instance pointing at the same Redis, so a session is
/// de-duplicated across nodes as long as its key has not expired.
pub struct RedisViewLedger {
    conn: ConnectionManager,
    config: RedisConfig,
}

impl RedisViewLedger {
    pub async fn new(config: RedisConfig) -> Result<Self, RepoError> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| RepoError::Connection(e.to_string()))?;

        // Use timeout to prevent hanging if Redis is unreachable
        let conn = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| RepoError::Timeout(config.connect_timeout))?
            .map_err(|e| RepoError::Connection(e.to_string()))?;

        tracing::info!(url = %config.url, "Connected to Redis view ledger");

        Ok(Self { conn, config })
    }

    /// Create from environment configuration.
    pub async fn from_env() -> Result<Self, RepoError> {
        Self::new(RedisConfig::from_env()).await
    }

    fn key(&self, session_id: &str) -> String {
        format!("{}:{}", self.config.key_prefix, session_id)
    }
}

#[async_trait]
impl ViewLedger for RedisViewLedger {
    async fn mark_viewed(&self, session_id: &str, post_id: Uuid) -> Result<bool, RepoError> {
        let mut conn = self.conn.clone();
        let key = self.key(session_id);
        let ttl = self.config.session_ttl.as_secs().max(1) as i64;

        // SADD reports 1 only for a new member, which makes it the atomic test-and-set.
        let (added,): (i64,) = redis::pipe()
            .atomic()
            .sadd(&key, post_id.to_string())
            .expire(&key, ttl)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(added == 1)
    }

    async fn forget(&self, session_id: &str, post_id: Uuid) -> Result<(), RepoError> {
        let mut conn = self.conn.clone();
        conn.srem::<_, _, ()>(self.key(session_id), post_id.to_string())
            .await
            .map_err(|e| RepoError::Query(e.to_string()))
    }

    async fn end_session(&self, session_id: &str) -> Result<(), RepoError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.key(session_id))
            .await
            .map_err(|e| RepoError::Query(e.to_string()))
    }
}
