use std::time::Duration;

use linkmint_cache::{CacheSettings, CacheTier, RedisSharedCache};
use linkmint_core::{SharedCache, ShortCode};
use linkmint_test_infra::redis::RedisServer;
use std::sync::Arc;

/// Test fixture that manages a Redis container using test-infra.
struct RedisFixture {
    redis: RedisServer,
    redis_url: String,
}

impl RedisFixture {
    async fn start() -> Self {
        let redis = RedisServer::new().await.expect("start redis");
        let redis_url = redis.redis_url().await.expect("redis url");

        // Wait a moment to ensure Redis is fully ready
        tokio::time::sleep(Duration::from_millis(500)).await;

        Self { redis, redis_url }
    }

    async fn cache(&self, prefix: &str) -> RedisSharedCache {
        RedisSharedCache::connect(&self.redis_url, prefix)
            .await
            .expect("connect to redis")
    }
}

#[tokio::test]
async fn get_and_set_round_trip() {
    let fixture = RedisFixture::start().await;
    let cache = fixture.cache("test:").await;

    assert_eq!(cache.get("code:abc123").await.unwrap(), None);

    cache
        .set("code:abc123", "https://example.com", Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(
        cache.get("code:abc123").await.unwrap().as_deref(),
        Some("https://example.com")
    );
}

#[tokio::test]
async fn entries_expire_after_ttl() {
    let fixture = RedisFixture::start().await;
    let cache = fixture.cache("ttl:").await;

    cache
        .set("code:short", "https://example.com", Duration::from_secs(1))
        .await
        .unwrap();
    assert!(cache.get("code:short").await.unwrap().is_some());

    tokio::time::sleep(Duration::from_millis(2_100)).await;

    assert!(cache.get("code:short").await.unwrap().is_none());
}

#[tokio::test]
async fn prefixes_isolate_caches() {
    let fixture = RedisFixture::start().await;
    let first = fixture.cache("first:").await;
    let second = fixture.cache("second:").await;

    first
        .set("code:abc123", "https://first.example", Duration::from_secs(60))
        .await
        .unwrap();

    assert!(second.get("code:abc123").await.unwrap().is_none());
}

#[tokio::test]
async fn tier_shares_entries_between_processes() {
    let fixture = RedisFixture::start().await;
    let writer = CacheTier::new(
        Some(Arc::new(fixture.cache("lm:").await)),
        CacheSettings::default(),
    );
    let reader = CacheTier::new(
        Some(Arc::new(fixture.cache("lm:").await)),
        CacheSettings::default(),
    );
    let code = ShortCode::new_unchecked("abc123");

    writer.put("https://example.com", &code).await;

    // the reader never saw the put locally; the hit comes from Redis
    assert!(reader.local().is_empty());
    assert_eq!(
        reader.lookup_by_url("https://example.com").await,
        Some(code.clone())
    );
    assert_eq!(
        reader.lookup_by_code(&code).await.as_deref(),
        Some("https://example.com")
    );
}

#[tokio::test]
async fn tier_keeps_serving_after_redis_goes_away() {
    let fixture = RedisFixture::start().await;
    let tier = CacheTier::new(
        Some(Arc::new(fixture.cache("lm:").await)),
        CacheSettings::default(),
    );
    let code = ShortCode::new_unchecked("abc123");
    tier.put("https://example.com", &code).await;

    fixture.redis.stop().await.expect("stop redis");

    assert_eq!(
        tier.lookup_by_url("https://example.com").await,
        Some(code.clone())
    );
    tier.put("https://example.com/2", &ShortCode::new_unchecked("def456"))
        .await;
    assert_eq!(
        tier.lookup_by_code(&ShortCode::new_unchecked("def456"))
            .await
            .as_deref(),
        Some("https://example.com/2")
    );
}
