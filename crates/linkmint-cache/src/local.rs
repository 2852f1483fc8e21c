use linkmint_core::ShortCode;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::trace;

#[derive(Debug, Default)]
struct Maps {
    by_url: HashMap<String, ShortCode>,
    by_code: HashMap<ShortCode, String>,
}

/// Process-local cache of `url <-> code` pairs.
///
/// Both directions live in one struct behind a single `RwLock`, so a reader
/// never sees a pair present in one map and missing from the other. Readers
/// share the lock; a writer holds it exclusively. Entries are never evicted.
#[derive(Debug, Default)]
pub struct LocalCache {
    maps: RwLock<Maps>,
}

impl LocalCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup_by_url(&self, url: &str) -> Option<ShortCode> {
        let code = self.maps.read().by_url.get(url).cloned();
        trace!(url, hit = code.is_some(), "local lookup by url");
        code
    }

    pub fn lookup_by_code(&self, code: &ShortCode) -> Option<String> {
        let url = self.maps.read().by_code.get(code).cloned();
        trace!(code = %code, hit = url.is_some(), "local lookup by code");
        url
    }

    /// Records the pair in both directions.
    ///
    /// A url can be shortened more than once; the forward entry keeps the
    /// latest code while every code stays resolvable.
    pub fn put(&self, url: &str, code: &ShortCode) {
        let mut maps = self.maps.write();
        maps.by_url.insert(url.to_owned(), code.clone());
        maps.by_code.insert(code.clone(), url.to_owned());
    }

    /// Number of distinct codes held.
    pub fn len(&self) -> usize {
        self.maps.read().by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    #[test]
    fn put_answers_both_directions() {
        let cache = LocalCache::new();
        assert!(cache.is_empty());

        cache.put("https://example.com", &code("abc123"));

        assert_eq!(
            cache.lookup_by_url("https://example.com"),
            Some(code("abc123"))
        );
        assert_eq!(
            cache.lookup_by_code(&code("abc123")).as_deref(),
            Some("https://example.com")
        );
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn misses_return_none() {
        let cache = LocalCache::new();
        assert!(cache.lookup_by_url("https://nope.example").is_none());
        assert!(cache.lookup_by_code(&code("nope")).is_none());
    }

    #[test]
    fn same_url_with_two_codes_keeps_both_resolvable() {
        let cache = LocalCache::new();
        cache.put("https://example.com", &code("first1"));
        cache.put("https://example.com", &code("second"));

        assert_eq!(
            cache.lookup_by_url("https://example.com"),
            Some(code("second"))
        );
        assert_eq!(
            cache.lookup_by_code(&code("first1")).as_deref(),
            Some("https://example.com")
        );
        assert_eq!(
            cache.lookup_by_code(&code("second")).as_deref(),
            Some("https://example.com")
        );
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn concurrent_writers_and_readers_stay_consistent() {
        let cache = Arc::new(LocalCache::new());

        let writers: Vec<_> = (0..4)
            .map(|w| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..500 {
                        let url = format!("https://example.com/{w}/{i}");
                        cache.put(&url, &code(&format!("c{w}-{i:04}")));
                    }
                })
            })
            .collect();

        let readers: Vec<_> = (0..4)
            .map(|w| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..500 {
                        let url = format!("https://example.com/{w}/{i}");
                        // a forward hit must always have its reverse entry
                        if let Some(c) = cache.lookup_by_url(&url) {
                            assert_eq!(cache.lookup_by_code(&c), Some(url));
                        }
                    }
                })
            })
            .collect();

        for handle in writers.into_iter().chain(readers) {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 2_000);
    }
}
