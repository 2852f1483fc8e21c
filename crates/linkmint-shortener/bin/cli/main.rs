mod cli;

use crate::cli::{Cli, Command, StorageBackendArg};
use anyhow::{bail, Context};
use clap::Parser;
use linkmint_cache::{CacheSettings, CacheTier, RedisSharedCache};
use linkmint_core::{validate_url, SharedCache, ShortCode, UrlStore};
use linkmint_shortener::{
    BatchPipeline, BatchSettings, FullQueuePolicy, Shortener, ShortenerSettings,
};
use linkmint_storage::{InMemoryStore, PgStore};
use linkmint_synth::{CodeSynthesizer, GenerationState};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

type CliShortener<S> = Shortener<S, CodeSynthesizer>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse();
    linkmint_telemetry::init(config.log_format)?;

    info!(
        storage_backend = %config.storage,
        shared_cache = config.redis_url.is_some(),
        "starting linkmint"
    );

    match config.storage {
        StorageBackendArg::InMemory => run(&config, Arc::new(InMemoryStore::new())).await,
        StorageBackendArg::Postgres => {
            let dsn = config
                .postgres_dsn
                .as_deref()
                .context("postgres dsn is required when storage backend is postgres")?;
            let store = PgStore::connect(dsn).await?;
            if config.init_schema {
                store.ensure_schema().await?;
            }
            run(&config, Arc::new(store)).await
        }
    }
}

async fn run<S: UrlStore>(config: &Cli, store: Arc<S>) -> anyhow::Result<()> {
    let cache = Arc::new(build_cache(config).await);
    let generator = Arc::new(CodeSynthesizer::new(Arc::new(GenerationState::new())));
    let settings = ShortenerSettings::builder()
        .max_attempts(config.max_attempts)
        .build();
    let shortener = Shortener::new(store, generator, cache, settings);

    match &config.command {
        Command::Shorten { urls } => shorten(&shortener, urls).await,
        Command::Resolve { codes } => resolve(&shortener, codes).await,
        Command::Batch => batch(&shortener, config).await,
    }
}

async fn build_cache(config: &Cli) -> CacheTier {
    let settings = CacheSettings::builder()
        .shared_ttl(Duration::from_secs(config.cache_ttl_secs))
        .build();

    let Some(redis_url) = config.redis_url.as_deref() else {
        return CacheTier::new(None, settings);
    };

    match RedisSharedCache::connect(redis_url, config.redis_key_prefix.as_str()).await {
        Ok(redis) => {
            info!("shared cache connected");
            let shared: Arc<dyn SharedCache> = Arc::new(redis);
            CacheTier::new(Some(shared), settings)
        }
        Err(e) => {
            warn!(error = %e, "shared cache unreachable, continuing with local cache only");
            CacheTier::new(None, settings)
        }
    }
}

async fn shorten<S: UrlStore>(shortener: &CliShortener<S>, urls: &[String]) -> anyhow::Result<()> {
    let mut failed = 0usize;

    for url in urls {
        if let Err(e) = validate_url(url) {
            eprintln!("{url}: {e}");
            failed += 1;
            continue;
        }
        match shortener.create(url).await {
            Ok(code) => println!("{code}\t{url}"),
            Err(e) => {
                eprintln!("{url}: {e}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} urls could not be shortened", urls.len());
    }
    Ok(())
}

async fn resolve<S: UrlStore>(shortener: &CliShortener<S>, codes: &[String]) -> anyhow::Result<()> {
    let mut failed = 0usize;

    for raw in codes {
        let resolved = match ShortCode::new(raw.as_str()) {
            Ok(code) => shortener.resolve(&code).await.map_err(anyhow::Error::from),
            Err(e) => Err(e.into()),
        };
        match resolved {
            Ok(url) => println!("{raw}\t{url}"),
            Err(e) => {
                eprintln!("{raw}: {e}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} codes could not be resolved", codes.len());
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct BatchLine<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn batch<S: UrlStore>(shortener: &CliShortener<S>, config: &Cli) -> anyhow::Result<()> {
    let settings = BatchSettings::builder()
        .queue_capacity(config.batch_queue_capacity)
        .max_attempts(config.batch_max_attempts)
        .full_queue(FullQueuePolicy::Wait)
        .build();
    let max_batch_len = settings.max_batch_len;
    let pipeline = shortener.spawn_batch_pipeline(settings);

    let input = BufReader::new(tokio::io::stdin());
    let (total, failed) =
        stream_batch(&pipeline, max_batch_len, input, &mut std::io::stdout()).await?;

    pipeline.shutdown().await?;
    info!(total, failed, "batch finished");
    Ok(())
}

/// Feeds urls from `input` through `pipeline`, writing one JSON line per url
/// to `out` in input order. Returns `(total, failed)`.
async fn stream_batch<R, W>(
    pipeline: &BatchPipeline,
    max_batch_len: usize,
    input: R,
    out: &mut W,
) -> anyhow::Result<(usize, usize)>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut pending = Vec::with_capacity(max_batch_len);
    let mut total = 0usize;
    let mut failed = 0usize;

    while let Some(line) = lines.next_line().await.context("failed to read input")? {
        let url = line.trim();
        if url.is_empty() {
            continue;
        }
        total += 1;

        match validate_url(url) {
            Ok(()) => {
                pending.push(url.to_string());
                if pending.len() == max_batch_len {
                    failed += flush(pipeline, &mut pending, out).await?;
                }
            }
            Err(e) => {
                // earlier urls must be printed first
                failed += flush(pipeline, &mut pending, out).await? + 1;
                write_line(
                    out,
                    &BatchLine {
                        url,
                        code: None,
                        error: Some(e.to_string()),
                    },
                )?;
            }
        }
    }

    failed += flush(pipeline, &mut pending, out).await?;
    Ok((total, failed))
}

/// Submits `pending` as one job and writes its results. Returns the number
/// of failed urls.
async fn flush<W: Write>(
    pipeline: &BatchPipeline,
    pending: &mut Vec<String>,
    out: &mut W,
) -> anyhow::Result<usize> {
    if pending.is_empty() {
        return Ok(0);
    }

    let mut failed = 0usize;
    let mut handle = pipeline.submit(std::mem::take(pending)).await?;
    while let Some(result) = handle.recv().await {
        let line = match &result.outcome {
            Ok(code) => BatchLine {
                url: &result.url,
                code: Some(code.as_str()),
                error: None,
            },
            Err(e) => {
                failed += 1;
                BatchLine {
                    url: &result.url,
                    code: None,
                    error: Some(e.to_string()),
                }
            }
        };
        write_line(out, &line)?;
    }
    Ok(failed)
}

fn write_line<W: Write>(out: &mut W, line: &BatchLine<'_>) -> anyhow::Result<()> {
    writeln!(out, "{}", serde_json::to_string(line)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_shortener() -> CliShortener<InMemoryStore> {
        Shortener::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(CodeSynthesizer::new(Arc::new(GenerationState::new()))),
            Arc::new(CacheTier::local_only()),
            ShortenerSettings::default(),
        )
    }

    fn urls_in_output(out: &[u8]) -> Vec<(String, bool)> {
        String::from_utf8(out.to_vec())
            .unwrap()
            .lines()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).unwrap();
                (
                    value["url"].as_str().unwrap().to_string(),
                    value.get("code").is_some(),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn batch_output_follows_input_order_around_invalid_urls() {
        let shortener = local_shortener();
        let pipeline = shortener.spawn_batch_pipeline(BatchSettings::default());
        let input: &[u8] = b"https://a.com\nhttps://b.com\nnot a url\n\nhttps://c.com\n";
        let mut out = Vec::new();

        let (total, failed) = stream_batch(&pipeline, 1000, input, &mut out)
            .await
            .unwrap();
        pipeline.shutdown().await.unwrap();

        assert_eq!((total, failed), (4, 1));
        assert_eq!(
            urls_in_output(&out),
            vec![
                ("https://a.com".to_string(), true),
                ("https://b.com".to_string(), true),
                ("not a url".to_string(), false),
                ("https://c.com".to_string(), true),
            ]
        );
    }

    #[tokio::test]
    async fn batch_input_is_split_into_jobs_of_max_len() {
        let shortener = local_shortener();
        let pipeline = shortener.spawn_batch_pipeline(BatchSettings::default());
        let input: &[u8] = b"https://a.com\nhttps://b.com\nhttps://c.com\n";
        let mut out = Vec::new();

        let (total, failed) = stream_batch(&pipeline, 2, input, &mut out).await.unwrap();
        pipeline.shutdown().await.unwrap();

        assert_eq!((total, failed), (3, 0));
        assert_eq!(shortener.store().len(), 3);
        assert_eq!(urls_in_output(&out).len(), 3);
    }
}
