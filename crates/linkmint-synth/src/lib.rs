//! Short code synthesis.
//!
//! [`CodeSynthesizer`] turns a process-wide counter, the wall clock and a
//! little jitter into fixed-length base-62 codes. It never touches storage;
//! collisions are the store's business, see the shortener's retry loop.

pub mod base62;
mod clock;
mod entropy;
mod state;
mod synthesizer;

pub use clock::{Clock, SystemClock};
pub use entropy::{Entropy, ThreadRngEntropy};
pub use state::GenerationState;
pub use synthesizer::{CodeSynthesizer, CODE_LENGTH};

use linkmint_core::ShortCode;

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage.
/// A generated code is a candidate: it is unique with very high probability,
/// and the store decides whether it actually is.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortCode>;

    /// Produces the next candidate code.
    fn generate(&self) -> Self::Output;
}
