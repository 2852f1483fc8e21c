use crate::error::StoreError;
use crate::mapping::UrlMapping;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Durable storage for `code -> url` mappings.
///
/// The store's uniqueness constraint on `code` is the only authority on
/// whether a code is taken. No in-process lock can stand in for it, so
/// callers must treat every insert as one that may collide.
#[async_trait]
pub trait UrlStore: Send + Sync + 'static {
    /// Inserts a new mapping.
    ///
    /// Returns `Err(StoreError::UniqueViolation)` if the code already exists.
    async fn insert_unique(&self, code: &ShortCode, url: &str) -> Result<()>;

    /// Fetches the mapping for a code.
    ///
    /// Returns `Err(StoreError::NotFound)` if the code does not exist.
    async fn find_by_code(&self, code: &ShortCode) -> Result<UrlMapping>;
}

#[async_trait]
impl<S: UrlStore> UrlStore for std::sync::Arc<S> {
    async fn insert_unique(&self, code: &ShortCode, url: &str) -> Result<()> {
        (**self).insert_unique(code, url).await
    }

    async fn find_by_code(&self, code: &ShortCode) -> Result<UrlMapping> {
        (**self).find_by_code(code).await
    }
}
