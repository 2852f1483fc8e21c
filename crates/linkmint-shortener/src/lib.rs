//! Short code creation, resolution and bulk loading.
//!
//! [`Shortener`] is the request path: it checks the cache tier, mints codes
//! with a [`Generator`](linkmint_synth::Generator), retries on collisions and
//! writes results through the cache. [`BatchPipeline`] is the bulk path: a
//! single background worker draining a bounded queue with the same retry
//! discipline, bypassing the cache.
//!
//! None of the operations here own a timeout. Callers that need one wrap the
//! future in `tokio::time::timeout`. The cache is written only after the store
//! operation has completed, and the local layer is filled in both directions
//! before any shared write is awaited, so a future dropped part way never
//! leaves a one-sided local entry. A shared write cut short may leave a
//! `code:` key without its `url:` key, which costs reuse but never resolves
//! wrongly.

pub mod batch;
pub mod error;
pub mod retry;
pub mod service;

pub use batch::{
    BatchHandle, BatchPipeline, BatchResult, BatchSettings, BatchSubmitter, FullQueuePolicy,
};
pub use error::{BatchError, CreateError, ResolveError};
pub use retry::RetryPolicy;
pub use service::{Shortener, ShortenerSettings};
