//! Deterministic random number generation for sequence building.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same seed produces identical sequence
//! - **Seedable from entropy**: Fresh unpredictable rounds by default
//! - **Context streams**: Independent sequences for different purposes
//!
//! ## Context Streams
//!
//! A round draws one seed, then derives an independent stream per stimulus
//! modality, so the visual and audio sequences of the same round never
//! correlate:
//!
//! ```
//! use nback_engine::core::GameRng;
//!
//! let rng = GameRng::new(42);
//! let mut visual = rng.for_context("visual");
//! let mut audio = rng.for_context("audio");
//!
//! let a: Vec<u32> = (0..4).map(|_| visual.gen_range_u32(0..1000)).collect();
//! let b: Vec<u32> = (0..4).map(|_| audio.gen_range_u32(0..1000)).collect();
//! assert_ne!(a, b);
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::hash::{Hash, Hasher};

/// Deterministic RNG backing the sequence generator.
///
/// Uses ChaCha8 for speed while maintaining cryptographic quality randomness.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a new RNG seeded from the OS entropy source.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::rngs::OsRng.gen())
    }

    /// The seed this RNG was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Create an independent stream for a specific context.
    ///
    /// Useful for separating randomness domains (e.g. the visual sequence
    /// vs the audio sequence of one round). The same context always
    /// produces the same stream from the same seed.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;

        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        context.hash(&mut hasher);
        let context_seed = hasher.finish();

        Self::new(context_seed)
    }

    /// Generate a random u64 (e.g. a per-round seed).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.gen()
    }

    /// Generate a random stimulus value in the given range.
    pub fn gen_range_u32(&mut self, range: std::ops::Range<u32>) -> u32 {
        self.inner.gen_range(range)
    }

    /// Generate a random usize in the given range.
    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }
}
