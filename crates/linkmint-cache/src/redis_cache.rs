use async_trait::async_trait;
use linkmint_core::cache::Result;
use linkmint_core::{CacheError, SharedCache};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, trace};

/// A Redis-backed [`SharedCache`].
///
/// Values are stored as plain strings under `<prefix><key>` with `SET ... EX`.
/// The connection manager reconnects on its own after Redis comes back.
#[derive(Clone)]
pub struct RedisSharedCache {
    conn: ConnectionManager,
    key_prefix: String,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> CacheError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        CacheError::Timeout(message)
    } else if err.is_connection_refusal() || err.is_connection_dropped() || err.is_io_error() {
        CacheError::Unavailable(message)
    } else {
        CacheError::Operation(message)
    }
}

impl RedisSharedCache {
    /// Wraps an existing connection manager with a custom key prefix.
    pub fn with_prefix(conn: ConnectionManager, key_prefix: impl Into<String>) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
        }
    }

    /// Opens a connection manager for `redis_url`.
    ///
    /// Fails if Redis cannot be reached right now; callers decide whether to
    /// run without a shared cache.
    pub async fn connect(redis_url: &str, key_prefix: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| CacheError::Unavailable(format!("invalid redis url: {e}")))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))?;
        Ok(Self::with_prefix(conn, key_prefix))
    }

    fn cache_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

impl std::fmt::Debug for RedisSharedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSharedCache")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SharedCache for RedisSharedCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = self.cache_key(key);
        trace!(key = %key, "GET from Redis");

        let mut conn = self.conn.clone();
        let value = conn
            .get::<_, Option<String>>(&key)
            .await
            .map_err(|e| map_redis_error("failed to fetch value from Redis", e))?;

        debug!(key = %key, hit = value.is_some(), "Redis lookup finished");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let key = self.cache_key(key);
        trace!(key = %key, ttl_secs = ttl.as_secs(), "SET EX in Redis");

        // SET EX rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(&key, value, seconds)
            .await
            .map_err(|e| map_redis_error("failed to write value to Redis", e))
    }
}
