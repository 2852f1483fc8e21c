use crate::error::CreateError;
use linkmint_core::{ShortCode, StoreError, UrlStore};
use linkmint_synth::Generator;
use std::time::Duration;
use tracing::{debug, warn};

/// How hard [`insert_with_retry`] tries before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total insert attempts, the first one included.
    pub max_attempts: u32,
    /// Sleep after a collision on attempt `n` is `backoff_step * n`.
    pub backoff_step: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_step: Duration) -> Self {
        Self {
            max_attempts,
            backoff_step,
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_step.saturating_mul(attempt)
    }
}

/// Mints codes from `generator` until one is accepted by `store` for `url`.
///
/// Only [`StoreError::UniqueViolation`] is retried, each time with a fresh
/// code. Any other store failure is returned on the spot. After
/// `policy.max_attempts` collisions the result is
/// [`CreateError::GenerationExhausted`]; there is no sleep after the last one.
pub async fn insert_with_retry<S, G>(
    store: &S,
    generator: &G,
    url: &str,
    policy: RetryPolicy,
) -> Result<ShortCode, CreateError>
where
    S: UrlStore + ?Sized,
    G: Generator + ?Sized,
{
    for attempt in 1..=policy.max_attempts {
        let code: ShortCode = generator.generate().into();

        match store.insert_unique(&code, url).await {
            Ok(()) => {
                debug!(code = %code, attempt, "stored new short code");
                return Ok(code);
            }
            Err(StoreError::UniqueViolation(_)) => {
                warn!(
                    code = %code,
                    attempt,
                    max_attempts = policy.max_attempts,
                    "short code collision"
                );
                if attempt < policy.max_attempts {
                    tokio::time::sleep(policy.backoff(attempt)).await;
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(CreateError::GenerationExhausted {
        attempts: policy.max_attempts,
    })
}
