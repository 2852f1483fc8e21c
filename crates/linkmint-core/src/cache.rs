use crate::error::CacheError;
use async_trait::async_trait;
use std::time::Duration;

/// Result type for shared cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// A distributed key/value cache shared between shortener processes.
///
/// Implementations report failures honestly; it is the cache tier's job to
/// turn them into misses so that an unreachable cache never fails a request.
#[async_trait]
pub trait SharedCache: Send + Sync + 'static {
    /// Get a value from the cache.
    ///
    /// Returns `Ok(None)` if the key is not in the cache.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value that expires after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
}

#[async_trait]
impl<C: SharedCache> SharedCache for std::sync::Arc<C> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        (**self).set(key, value, ttl).await
    }
}
