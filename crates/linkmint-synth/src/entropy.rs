/// Source of the sub-millisecond jitter mixed into every code.
pub trait Entropy: Send + Sync {
    /// Returns a value in `0..1000`.
    fn jitter(&self) -> u64;
}

/// Jitter drawn from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngEntropy;

impl Entropy for ThreadRngEntropy {
    fn jitter(&self) -> u64 {
        rand::random_range(0..1000)
    }
}
