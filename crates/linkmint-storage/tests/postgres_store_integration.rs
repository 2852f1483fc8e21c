use std::time::Duration;

use linkmint_core::{ShortCode, StoreError, UrlStore};
use linkmint_storage::PgStore;
use linkmint_test_infra::postgres::{PostgresConfig, PostgresServer};
use sqlx::postgres::PgPoolOptions;

struct Fixture {
    _postgres: PostgresServer,
    store: PgStore,
}

impl Fixture {
    async fn start() -> Self {
        let postgres = PostgresServer::new(PostgresConfig::builder().build())
            .await
            .expect("start postgres");
        let url = postgres.database_url().await.expect("postgres url");
        let pool = connect_with_retry(&url).await;

        let store = PgStore::new(pool);
        store.ensure_schema().await.expect("create schema");

        Self {
            _postgres: postgres,
            store,
        }
    }
}

async fn connect_with_retry(url: &str) -> sqlx::PgPool {
    let mut last_error = None;

    for _ in 0..20 {
        match PgPoolOptions::new().max_connections(5).connect(url).await {
            Ok(pool) => return pool,
            Err(err) => {
                last_error = Some(err);
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }

    panic!("failed to connect postgres: {last_error:?}");
}

fn code(value: &str) -> ShortCode {
    ShortCode::new_unchecked(value)
}

#[tokio::test]
async fn insert_and_find_mapping() {
    let fixture = Fixture::start().await;

    fixture
        .store
        .insert_unique(&code("abc123"), "https://example.com")
        .await
        .unwrap();

    let got = fixture.store.find_by_code(&code("abc123")).await.unwrap();
    assert_eq!(got.code, code("abc123"));
    assert_eq!(got.url, "https://example.com");
}

#[tokio::test]
async fn duplicate_code_is_a_unique_violation() {
    let fixture = Fixture::start().await;

    fixture
        .store
        .insert_unique(&code("dup123"), "https://example.com/1")
        .await
        .unwrap();
    let err = fixture
        .store
        .insert_unique(&code("dup123"), "https://example.com/2")
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::UniqueViolation(_)));
    let got = fixture.store.find_by_code(&code("dup123")).await.unwrap();
    assert_eq!(got.url, "https://example.com/1");
}

#[tokio::test]
async fn same_url_may_be_stored_under_two_codes() {
    let fixture = Fixture::start().await;

    fixture
        .store
        .insert_unique(&code("one111"), "https://example.com")
        .await
        .unwrap();
    fixture
        .store
        .insert_unique(&code("two222"), "https://example.com")
        .await
        .unwrap();

    assert_eq!(
        fixture.store.find_by_code(&code("one111")).await.unwrap().url,
        "https://example.com"
    );
    assert_eq!(
        fixture.store.find_by_code(&code("two222")).await.unwrap().url,
        "https://example.com"
    );
}

#[tokio::test]
async fn missing_code_is_not_found() {
    let fixture = Fixture::start().await;

    let err = fixture
        .store
        .find_by_code(&code("doesnotexist"))
        .await
        .unwrap_err();

    assert_eq!(err, StoreError::NotFound("doesnotexist".to_string()));
}

#[tokio::test]
async fn ensure_schema_is_idempotent() {
    let fixture = Fixture::start().await;

    fixture.store.ensure_schema().await.unwrap();
    fixture.store.ensure_schema().await.unwrap();
}
