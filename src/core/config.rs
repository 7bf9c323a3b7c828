//! Round configuration.
//!
//! `RoundConfig` holds the tunable parameters of a round. Setters validate
//! their input and silently reject out-of-range values (returning `false`
//! so callers can log the reject); they also maintain the coupling
//! invariant between `n_back` and `round_length`: a round is never shorter
//! than its n-back depth.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fixed match density of generated sequences, in percent.
pub const MATCH_PERCENTAGE: u32 = 30;

/// Largest accepted n-back depth.
pub const MAX_N_BACK: u32 = 50;

/// Tunable parameters of a round.
///
/// ## Defaults
///
/// - `n_back`: 2
/// - `round_length`: 10 stimuli
/// - `grid_size`: 3 (visual alphabet = 9 tiles)
/// - `spoken_letters`: 9
/// - `stimulus_interval`: 2000 ms
///
/// Deserialization fills missing fields from these defaults, so a partial
/// persisted snapshot degrades gracefully field by field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    n_back: u32,
    round_length: u32,
    grid_size: u32,
    spoken_letters: u32,
    stimulus_interval_ms: u64,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            n_back: 2,
            round_length: 10,
            grid_size: 3,
            spoken_letters: 9,
            stimulus_interval_ms: 2000,
        }
    }
}

impl RoundConfig {
    /// Create a configuration with the default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// How many steps back a stimulus must match.
    #[must_use]
    pub fn n_back(&self) -> u32 {
        self.n_back
    }

    /// Number of stimuli presented per round.
    #[must_use]
    pub fn round_length(&self) -> u32 {
        self.round_length
    }

    /// Side length of the visual tile grid.
    #[must_use]
    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Size of the visual alphabet: one value per grid tile.
    #[must_use]
    pub fn visual_alphabet(&self) -> u32 {
        self.grid_size * self.grid_size
    }

    /// Size of the spoken-letter alphabet.
    #[must_use]
    pub fn spoken_letters(&self) -> u32 {
        self.spoken_letters
    }

    /// Time each stimulus stays current before the next reveal.
    #[must_use]
    pub fn stimulus_interval(&self) -> Duration {
        Duration::from_millis(self.stimulus_interval_ms)
    }

    /// Set the n-back depth.
    ///
    /// Rejects 0 and values above [`MAX_N_BACK`]. Raising the depth above
    /// the current round length raises the round length to match.
    pub fn set_n_back(&mut self, n_back: u32) -> bool {
        if n_back == 0 || n_back > MAX_N_BACK {
            return false;
        }
        self.n_back = n_back;
        if n_back > self.round_length {
            self.round_length = n_back;
        }
        true
    }

    /// Set the number of stimuli per round.
    ///
    /// Rejects 0. Lowering the length below the current n-back depth
    /// lowers the depth to match.
    pub fn set_round_length(&mut self, round_length: u32) -> bool {
        if round_length == 0 {
            return false;
        }
        self.round_length = round_length;
        if round_length < self.n_back {
            self.n_back = round_length;
        }
        true
    }

    /// Set the visual grid side length. Rejects 0.
    pub fn set_grid_size(&mut self, grid_size: u32) -> bool {
        if grid_size == 0 {
            return false;
        }
        self.grid_size = grid_size;
        true
    }

    /// Set the spoken-letter alphabet size. Rejects 0.
    pub fn set_spoken_letters(&mut self, spoken_letters: u32) -> bool {
        if spoken_letters == 0 {
            return false;
        }
        self.spoken_letters = spoken_letters;
        true
    }

    /// Set the inter-stimulus interval. Rejects a zero duration.
    pub fn set_stimulus_interval(&mut self, interval: Duration) -> bool {
        if interval.is_zero() {
            return false;
        }
        self.stimulus_interval_ms = interval.as_millis() as u64;
        true
    }

    /// Replace out-of-range fields with their defaults and re-establish the
    /// `n_back <= round_length` invariant.
    ///
    /// Persisted snapshots bypass the setters, so values loaded from
    /// storage go through this before the engine caches them.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut config = Self {
            n_back: if self.n_back == 0 || self.n_back > MAX_N_BACK {
                defaults.n_back
            } else {
                self.n_back
            },
            round_length: if self.round_length == 0 {
                defaults.round_length
            } else {
                self.round_length
            },
            grid_size: if self.grid_size == 0 {
                defaults.grid_size
            } else {
                self.grid_size
            },
            spoken_letters: if self.spoken_letters == 0 {
                defaults.spoken_letters
            } else {
                self.spoken_letters
            },
            stimulus_interval_ms: if self.stimulus_interval_ms == 0 {
                defaults.stimulus_interval_ms
            } else {
                self.stimulus_interval_ms
            },
        };
        if config.round_length < config.n_back {
            config.round_length = config.n_back;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RoundConfig::new();
        assert_eq!(config.n_back(), 2);
        assert_eq!(config.round_length(), 10);
        assert_eq!(config.grid_size(), 3);
        assert_eq!(config.visual_alphabet(), 9);
        assert_eq!(config.spoken_letters(), 9);
        assert_eq!(config.stimulus_interval(), Duration::from_millis(2000));
    }

    #[test]
    fn test_setters_reject_out_of_range() {
        let mut config = RoundConfig::new();

        assert!(!config.set_n_back(0));
        assert!(!config.set_n_back(MAX_N_BACK + 1));
        assert!(!config.set_round_length(0));
        assert!(!config.set_grid_size(0));
        assert!(!config.set_spoken_letters(0));
        assert!(!config.set_stimulus_interval(Duration::ZERO));

        // Nothing changed
        assert_eq!(config, RoundConfig::default());
    }

    #[test]
    fn test_n_back_raises_round_length() {
        let mut config = RoundConfig::new();

        assert!(config.set_n_back(25));
        assert_eq!(config.n_back(), 25);
        assert_eq!(config.round_length(), 25);
    }

    #[test]
    fn test_round_length_lowers_n_back() {
        let mut config = RoundConfig::new();
        assert!(config.set_n_back(5));
        assert!(config.set_round_length(20));

        assert!(config.set_round_length(3));
        assert_eq!(config.round_length(), 3);
        assert_eq!(config.n_back(), 3);
    }

    #[test]
    fn test_coupling_untouched_when_in_range() {
        let mut config = RoundConfig::new();

        assert!(config.set_n_back(3));
        assert_eq!(config.round_length(), 10);

        assert!(config.set_round_length(5));
        assert_eq!(config.n_back(), 3);
    }

    #[test]
    fn test_max_n_back_accepted() {
        let mut config = RoundConfig::new();
        assert!(config.set_n_back(MAX_N_BACK));
        assert_eq!(config.n_back(), MAX_N_BACK);
        assert_eq!(config.round_length(), MAX_N_BACK);
    }

    #[test]
    fn test_sanitized_replaces_invalid_fields() {
        let corrupt: RoundConfig = serde_json::from_str(
            r#"{"n_back":0,"round_length":0,"grid_size":4,"spoken_letters":0,"stimulus_interval_ms":0}"#,
        )
        .unwrap();

        let config = corrupt.sanitized();
        assert_eq!(config.n_back(), 2);
        assert_eq!(config.round_length(), 10);
        assert_eq!(config.grid_size(), 4);
        assert_eq!(config.spoken_letters(), 9);
        assert_eq!(config.stimulus_interval(), Duration::from_millis(2000));
    }

    #[test]
    fn test_sanitized_restores_coupling() {
        let skewed: RoundConfig =
            serde_json::from_str(r#"{"n_back":12,"round_length":4}"#).unwrap();

        let config = skewed.sanitized();
        assert_eq!(config.n_back(), 12);
        assert_eq!(config.round_length(), 12);
    }

    #[test]
    fn test_serde_missing_fields_fall_back() {
        let config: RoundConfig = serde_json::from_str(r#"{"n_back":3}"#).unwrap();
        assert_eq!(config.n_back(), 3);
        assert_eq!(config.round_length(), 10);
        assert_eq!(config.stimulus_interval(), Duration::from_millis(2000));
    }

    #[test]
    fn test_serde_round_trip() {
        let mut config = RoundConfig::new();
        config.set_n_back(4);
        config.set_stimulus_interval(Duration::from_millis(1500));

        let json = serde_json::to_string(&config).unwrap();
        let back: RoundConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
