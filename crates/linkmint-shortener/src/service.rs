use crate::batch::{BatchPipeline, BatchSettings};
use crate::error::{CreateError, ResolveError};
use crate::retry::{insert_with_retry, RetryPolicy};
use linkmint_cache::CacheTier;
use linkmint_core::{ShortCode, UrlStore};
use linkmint_synth::Generator;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use typed_builder::TypedBuilder;

/// Retry settings for the request path.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenerSettings {
    #[builder(default = 10)]
    pub max_attempts: u32,
    #[builder(default = Duration::from_millis(1))]
    pub backoff_step: Duration,
}

impl ShortenerSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.backoff_step)
    }
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Creates and resolves short codes on the request path.
///
/// The store, generator and cache tier are shared by reference count, so a
/// `Shortener` is cheap to clone into every request task. Collision handling
/// lives in [`insert_with_retry`]; the generator is never trusted to be
/// unique on its own.
pub struct Shortener<S, G> {
    store: Arc<S>,
    generator: Arc<G>,
    cache: Arc<CacheTier>,
    settings: ShortenerSettings,
}

impl<S: UrlStore, G: Generator> Shortener<S, G> {
    pub fn new(
        store: Arc<S>,
        generator: Arc<G>,
        cache: Arc<CacheTier>,
        settings: ShortenerSettings,
    ) -> Self {
        Self {
            store,
            generator,
            cache,
            settings,
        }
    }

    pub fn cache(&self) -> &CacheTier {
        &self.cache
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns a code for `url`, reusing a cached one when there is one.
    ///
    /// Reuse is best effort: two first-time requests for the same url racing
    /// each other may both mint a code. Both codes resolve correctly.
    pub async fn create(&self, url: &str) -> Result<ShortCode, CreateError> {
        if let Some(code) = self.cache.lookup_by_url(url).await {
            debug!(code = %code, "reusing cached short code");
            return Ok(code);
        }

        let code = insert_with_retry(
            self.store.as_ref(),
            self.generator.as_ref(),
            url,
            self.settings.retry_policy(),
        )
        .await?;

        self.cache.put(url, &code).await;
        Ok(code)
    }

    /// Returns the url stored under `code`.
    pub async fn resolve(&self, code: &ShortCode) -> Result<String, ResolveError> {
        if let Some(url) = self.cache.lookup_by_code(code).await {
            return Ok(url);
        }

        let mapping = self.store.find_by_code(code).await?;
        debug!(code = %code, "resolved from store, populating cache");
        self.cache.put(&mapping.url, code).await;
        Ok(mapping.url)
    }

    /// Starts a batch pipeline that shares this shortener's store and
    /// generator. The pipeline never touches the cache tier.
    pub fn spawn_batch_pipeline(&self, settings: BatchSettings) -> BatchPipeline {
        BatchPipeline::spawn(Arc::clone(&self.store), Arc::clone(&self.generator), settings)
    }
}

impl<S, G> Clone for Shortener<S, G> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            generator: Arc::clone(&self.generator),
            cache: Arc::clone(&self.cache),
            settings: self.settings.clone(),
        }
    }
}

impl<S, G> std::fmt::Debug for Shortener<S, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shortener")
            .field("cache", &self.cache)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
