use std::sync::atomic::{AtomicU64, Ordering};

/// The process-wide generation counter.
///
/// Share one instance (behind an `Arc`) between every component that mints
/// codes. It is only ever advanced with an atomic increment, never reset.
#[derive(Debug, Default)]
pub struct GenerationState {
    counter: AtomicU64,
}

impl GenerationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the counter after `offset`, so the first value handed out is
    /// `offset + 1`.
    pub fn with_offset(offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
        }
    }

    /// Advances the counter and returns the new value.
    ///
    /// Values are strictly increasing in the order the increments happen.
    pub fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// The most recently issued value, `0` before the first call to `next`.
    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}
