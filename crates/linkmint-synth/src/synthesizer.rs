use crate::{
    base62::{self, ALPHABET},
    clock::{Clock, SystemClock},
    entropy::{Entropy, ThreadRngEntropy},
    state::GenerationState,
    Generator,
};
use linkmint_core::ShortCode;
use std::sync::Arc;

/// Length of every synthesized code.
pub const CODE_LENGTH: usize = 10;

const COUNTER_MASK: u64 = 0xFFFF_FFFF;
const MILLIS_MASK: u64 = (1 << 22) - 1;
const JITTER_BITS: u32 = 10;
const JITTER_RANGE: u64 = 1000;

/// Builds fixed-length codes from a counter, a timestamp and jitter.
///
/// The three inputs are packed into one `u64`:
///
/// ```text
/// | counter (32 bits) | millis (22 bits) | jitter (10 bits) |
/// ```
///
/// The counter sits in the high bits, so packed values strictly increase from
/// call to call even when two calls read the same millisecond. The packed
/// value is base-62 encoded, then padded with counter-derived symbols or
/// truncated to [`CODE_LENGTH`]. Truncation drops low-order digits, which is
/// why two codes may still collide and the store has the final word.
pub struct CodeSynthesizer<C = SystemClock, E = ThreadRngEntropy> {
    state: Arc<GenerationState>,
    clock: C,
    entropy: E,
}

impl CodeSynthesizer {
    /// Creates a synthesizer driven by the system clock and thread RNG.
    pub fn new(state: Arc<GenerationState>) -> Self {
        Self::with_sources(state, SystemClock, ThreadRngEntropy)
    }
}

impl<C: Clock, E: Entropy> CodeSynthesizer<C, E> {
    pub fn with_sources(state: Arc<GenerationState>, clock: C, entropy: E) -> Self {
        Self {
            state,
            clock,
            entropy,
        }
    }

    /// The counter shared with every other component minting codes.
    pub fn state(&self) -> &Arc<GenerationState> {
        &self.state
    }

    pub fn synthesize(&self) -> ShortCode {
        let counter = self.state.next();
        let millis = self.clock.now().as_millisecond() as u64;
        let jitter = self.entropy.jitter() % JITTER_RANGE;

        let packed = (counter & COUNTER_MASK) << 32 | (millis & MILLIS_MASK) << JITTER_BITS | jitter;

        ShortCode::new_unchecked(fit_to_length(base62::encode(packed), counter))
    }
}

fn fit_to_length(mut encoded: String, counter: u64) -> String {
    if encoded.len() > CODE_LENGTH {
        encoded.truncate(CODE_LENGTH);
        return encoded;
    }

    while encoded.len() < CODE_LENGTH {
        let index = (counter + encoded.len() as u64) % ALPHABET.len() as u64;
        encoded.push(char::from(ALPHABET[index as usize]));
    }
    encoded
}

impl<C, E> Generator for CodeSynthesizer<C, E>
where
    C: Clock + 'static,
    E: Entropy + 'static,
{
    type Output = ShortCode;

    fn generate(&self) -> Self::Output {
        self.synthesize()
    }
}
