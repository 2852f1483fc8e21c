use linkmint_core::StoreError;
use thiserror::Error;

/// Why a `create` call failed.
///
/// Short code collisions never show up here; they are retried inside the
/// shortener until it succeeds or runs out of attempts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateError {
    #[error("no unique short code after {attempts} attempts")]
    GenerationExhausted { attempts: u32 },
    #[error("storage unavailable: {0}")]
    StoreUnavailable(String),
    #[error("storage error: {0}")]
    Store(String),
}

/// Why a `resolve` call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("storage unavailable: {0}")]
    StoreUnavailable(String),
    #[error("storage error: {0}")]
    Store(String),
}

/// Why a batch could not be queued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("batch queue is full")]
    QueueFull,
    #[error("batch pipeline is shut down")]
    Closed,
    #[error("batch of {len} urls exceeds the limit of {max}")]
    TooLarge { len: usize, max: usize },
    #[error("batch worker failed: {0}")]
    Worker(String),
}

impl From<StoreError> for CreateError {
    fn from(value: StoreError) -> Self {
        if value.is_unavailable() {
            Self::StoreUnavailable(value.to_string())
        } else {
            Self::Store(value.to_string())
        }
    }
}

impl From<StoreError> for ResolveError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(code) => Self::NotFound(code),
            other if other.is_unavailable() => Self::StoreUnavailable(other.to_string()),
            other => Self::Store(other.to_string()),
        }
    }
}
