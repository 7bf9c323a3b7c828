//! Stimulus sequences and their generation.
//!
//! A round presents one `Sequence` per active modality. The generator
//! places a controlled number of n-back matches: a target count of
//! positions is forced to repeat the value n steps earlier, and the rest
//! are drawn uniformly from the alphabet.
//!
//! ## Match Density
//!
//! For `generate(length, alphabet_size, match_percentage, n)` the target
//! match count is `round(length * match_percentage / 100)`, clamped to
//! `length - n` since only positions at index `>= n` can match. Forced
//! positions always match; unforced positions at index `>= n` may still
//! collide with their n-back value by chance, so the realized count is
//! near the target but only its lower bound is exact. One resample on an
//! accidental collision keeps the overshoot small without biasing the
//! alphabet.

use smallvec::SmallVec;
use thiserror::Error;

use super::rng::GameRng;

/// Inline capacity covers the default round length with headroom.
type Values = SmallVec<[u32; 32]>;

/// Invalid input to [`SequenceGenerator::generate`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    /// A precondition on the generation parameters was violated.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// An immutable ordered list of stimulus values for one modality.
///
/// Values lie in `[0, alphabet_size)` for the alphabet the sequence was
/// generated over. Owned by the engine for the duration of a round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sequence {
    values: Values,
}

impl Sequence {
    /// Number of stimuli in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Is the sequence empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The stimulus value at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<u32> {
        self.values.get(index).copied()
    }

    /// The values as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.values
    }

    /// Does the value at `index` repeat the value `n` steps earlier?
    ///
    /// Always false for `index < n`.
    #[must_use]
    pub fn is_match_at(&self, index: usize, n: usize) -> bool {
        index >= n
            && index < self.values.len()
            && self.values[index] == self.values[index - n]
    }

    /// Count of positions that repeat the value `n` steps earlier.
    #[must_use]
    pub fn match_count(&self, n: usize) -> usize {
        (0..self.values.len())
            .filter(|&i| self.is_match_at(i, n))
            .count()
    }
}

impl From<Vec<u32>> for Sequence {
    fn from(values: Vec<u32>) -> Self {
        Self {
            values: Values::from_vec(values),
        }
    }
}

/// Builds stimulus sequences with a controlled n-back match density.
#[derive(Clone, Debug)]
pub struct SequenceGenerator {
    rng: GameRng,
}

impl SequenceGenerator {
    /// Create a generator seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: GameRng::from_entropy(),
        }
    }

    /// Create a deterministic generator from a seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(GameRng::new(seed))
    }

    /// Create a generator over an existing RNG stream.
    #[must_use]
    pub fn from_rng(rng: GameRng) -> Self {
        Self { rng }
    }

    /// Generate a sequence of `length` values in `[0, alphabet_size)` with
    /// roughly `match_percentage` percent of positions matching their
    /// value `n` steps earlier.
    ///
    /// ## Errors
    ///
    /// `InvalidArgument` when `length` or `alphabet_size` is 0, `n` is 0,
    /// or `match_percentage` exceeds 100.
    ///
    /// ## Degenerate depth
    ///
    /// `n >= length` is accepted: no position can structurally match, so
    /// the target match count is zero and the sequence is fully random.
    pub fn generate(
        &mut self,
        length: usize,
        alphabet_size: u32,
        match_percentage: u32,
        n: usize,
    ) -> Result<Sequence, GenerateError> {
        if length == 0 {
            return Err(GenerateError::InvalidArgument("length must be positive"));
        }
        if alphabet_size == 0 {
            return Err(GenerateError::InvalidArgument(
                "alphabet size must be positive",
            ));
        }
        if n == 0 {
            return Err(GenerateError::InvalidArgument("n must be at least 1"));
        }
        if match_percentage > 100 {
            return Err(GenerateError::InvalidArgument(
                "match percentage must be at most 100",
            ));
        }

        // Only positions at index >= n can match at all.
        let max_matches = length.saturating_sub(n);
        let target = (length as u64 * u64::from(match_percentage) + 50) / 100;
        let target = (target as usize).min(max_matches);

        // Pick the forced-match positions uniformly without replacement.
        let mut candidates: Vec<usize> = (n..length).collect();
        self.rng.shuffle(&mut candidates);
        let mut forced = vec![false; length];
        for &index in &candidates[..target] {
            forced[index] = true;
        }

        let mut values = Values::with_capacity(length);
        for index in 0..length {
            if forced[index] {
                let earlier = values[index - n];
                values.push(earlier);
            } else {
                let mut value = self.rng.gen_range_u32(0..alphabet_size);
                if alphabet_size > 1 && index >= n && value == values[index - n] {
                    // One resample on an accidental match keeps the
                    // realized count near the target.
                    value = self.rng.gen_range_u32(0..alphabet_size);
                }
                values.push(value);
            }
        }

        Ok(Sequence { values })
    }
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rejects_invalid_arguments() {
        let mut generator = SequenceGenerator::with_seed(1);

        assert!(matches!(
            generator.generate(0, 9, 30, 2),
            Err(GenerateError::InvalidArgument(_))
        ));
        assert!(matches!(
            generator.generate(10, 0, 30, 2),
            Err(GenerateError::InvalidArgument(_))
        ));
        assert!(matches!(
            generator.generate(10, 9, 30, 0),
            Err(GenerateError::InvalidArgument(_))
        ));
        assert!(matches!(
            generator.generate(10, 9, 101, 2),
            Err(GenerateError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_length_and_alphabet_bounds() {
        let mut generator = SequenceGenerator::with_seed(42);
        let sequence = generator.generate(10, 9, 30, 2).unwrap();

        assert_eq!(sequence.len(), 10);
        assert!(sequence.as_slice().iter().all(|&v| v < 9));
    }

    #[test]
    fn test_forced_matches_are_lower_bound() {
        // round(20 * 30 / 100) = 6 forced matches, more only by chance.
        let mut generator = SequenceGenerator::with_seed(7);
        for _ in 0..50 {
            let sequence = generator.generate(20, 9, 30, 2).unwrap();
            assert!(sequence.match_count(2) >= 6);
            assert!(sequence.match_count(2) <= 18);
        }
    }

    #[test]
    fn test_full_density_matches_everywhere_possible() {
        let mut generator = SequenceGenerator::with_seed(3);
        let sequence = generator.generate(12, 9, 100, 3).unwrap();
        assert_eq!(sequence.match_count(3), 9);
    }

    #[test]
    fn test_unit_alphabet_matches_everywhere() {
        let mut generator = SequenceGenerator::with_seed(5);
        let sequence = generator.generate(8, 1, 0, 2).unwrap();

        assert!(sequence.as_slice().iter().all(|&v| v == 0));
        assert_eq!(sequence.match_count(2), 6);
    }

    #[test]
    fn test_degenerate_depth_is_fully_random() {
        let mut generator = SequenceGenerator::with_seed(11);
        let sequence = generator.generate(5, 9, 30, 5).unwrap();

        assert_eq!(sequence.len(), 5);
        // No position can match at depth 5 in a 5-long sequence.
        assert_eq!(sequence.match_count(5), 0);
    }

    #[test]
    fn test_seed_determinism() {
        let mut generator1 = SequenceGenerator::with_seed(99);
        let mut generator2 = SequenceGenerator::with_seed(99);

        let a = generator1.generate(30, 16, 30, 2).unwrap();
        let b = generator2.generate(30, 16, 30, 2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_match_count_worked_example() {
        let sequence = Sequence::from(vec![1, 2, 1, 2, 1, 2, 1, 2, 1, 9]);

        assert_eq!(sequence.match_count(2), 7);
        for index in 2..=8 {
            assert!(sequence.is_match_at(index, 2));
        }
        assert!(!sequence.is_match_at(9, 2));
        assert!(!sequence.is_match_at(0, 2));
        assert!(!sequence.is_match_at(1, 2));
    }

    proptest! {
        #[test]
        fn prop_length_and_bounds(
            length in 1usize..64,
            alphabet in 1u32..32,
            percentage in 0u32..=100,
            n in 1usize..8,
            seed in any::<u64>(),
        ) {
            let mut generator = SequenceGenerator::with_seed(seed);
            let sequence = generator.generate(length, alphabet, percentage, n).unwrap();

            prop_assert_eq!(sequence.len(), length);
            prop_assert!(sequence.as_slice().iter().all(|&v| v < alphabet));
        }

        #[test]
        fn prop_realized_matches_bracket_target(
            length in 2usize..64,
            alphabet in 2u32..32,
            percentage in 0u32..=100,
            n in 1usize..8,
            seed in any::<u64>(),
        ) {
            let mut generator = SequenceGenerator::with_seed(seed);
            let sequence = generator.generate(length, alphabet, percentage, n).unwrap();

            let max_matches = length.saturating_sub(n);
            let target = ((length as u64 * u64::from(percentage) + 50) / 100) as usize;
            let target = target.min(max_matches);

            let realized = sequence.match_count(n);
            prop_assert!(realized >= target);
            prop_assert!(realized <= max_matches);
        }
    }
}
