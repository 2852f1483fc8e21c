use crate::local::LocalCache;
use linkmint_core::{SharedCache, ShortCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

const URL_KEY_PREFIX: &str = "url:";
const CODE_KEY_PREFIX: &str = "code:";

/// Settings for the shared layer of a [`CacheTier`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct CacheSettings {
    /// How long shared entries live. Local entries never expire.
    #[builder(default = Duration::from_secs(24 * 60 * 60))]
    pub shared_ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// The two cache layers consulted before the durable store.
///
/// # Operation Strategy
///
/// - **Lookup**: ask the shared layer first, then the local layer. A shared
///   hit is copied into the local layer before returning.
/// - **Put**: write the pair to the shared layer (both keys) and to the local
///   layer (both directions).
///
/// The shared layer is best effort. When it is absent or returns an error the
/// tier logs a warning and carries on as if it had missed, so a tier without
/// Redis behaves exactly like one whose Redis is down.
pub struct CacheTier {
    shared: Option<Arc<dyn SharedCache>>,
    local: LocalCache,
    settings: CacheSettings,
}

impl CacheTier {
    pub fn new(shared: Option<Arc<dyn SharedCache>>, settings: CacheSettings) -> Self {
        Self {
            shared,
            local: LocalCache::new(),
            settings,
        }
    }

    /// A tier with only the process-local layer.
    pub fn local_only() -> Self {
        Self::new(None, CacheSettings::default())
    }

    /// A tier backed by `shared` with default settings.
    pub fn with_shared(shared: impl SharedCache) -> Self {
        Self::new(Some(Arc::new(shared)), CacheSettings::default())
    }

    pub fn local(&self) -> &LocalCache {
        &self.local
    }

    pub fn has_shared(&self) -> bool {
        self.shared.is_some()
    }

    /// Finds a code previously minted for `url`.
    pub async fn lookup_by_url(&self, url: &str) -> Option<ShortCode> {
        if let Some(code) = self.shared_get(&url_key(url)).await {
            let code = ShortCode::new_unchecked(code);
            debug!(code = %code, "shared cache hit by url, backfilling local");
            self.local.put(url, &code);
            return Some(code);
        }

        let code = self.local.lookup_by_url(url);
        if code.is_some() {
            debug!(url, "local cache hit by url");
        }
        code
    }

    /// Finds the url behind `code`.
    pub async fn lookup_by_code(&self, code: &ShortCode) -> Option<String> {
        if let Some(url) = self.shared_get(&code_key(code)).await {
            debug!(code = %code, "shared cache hit by code, backfilling local");
            self.local.put(&url, code);
            return Some(url);
        }

        let url = self.local.lookup_by_code(code);
        if url.is_some() {
            debug!(code = %code, "local cache hit by code");
        }
        url
    }

    /// Writes the pair through both layers.
    ///
    /// The local layer is written before the first await, so dropping the
    /// future part way still leaves both local directions in place. The
    /// shared `code:` key goes before `url:`; a write cut short leaves at
    /// most a resolvable code without its reuse entry.
    pub async fn put(&self, url: &str, code: &ShortCode) {
        trace!(code = %code, "writing through cache tier");
        self.local.put(url, code);

        if let Some(shared) = &self.shared {
            let ttl = self.settings.shared_ttl;
            if let Err(e) = shared.set(&code_key(code), url, ttl).await {
                warn!(code = %code, error = %e, "shared cache write by code failed");
            }
            if let Err(e) = shared.set(&url_key(url), code.as_str(), ttl).await {
                warn!(code = %code, error = %e, "shared cache write by url failed");
            }
        }
    }

    async fn shared_get(&self, key: &str) -> Option<String> {
        let shared = self.shared.as_ref()?;
        match shared.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "shared cache read failed, treating as miss");
                None
            }
        }
    }
}

impl std::fmt::Debug for CacheTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheTier")
            .field("has_shared", &self.has_shared())
            .field("local_entries", &self.local.len())
            .field("settings", &self.settings)
            .finish()
    }
}

fn url_key(url: &str) -> String {
    format!("{URL_KEY_PREFIX}{url}")
}

fn code_key(code: &ShortCode) -> String {
    format!("{CODE_KEY_PREFIX}{code}")
}
