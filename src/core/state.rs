//! Game state snapshot published to the presentation layer.
//!
//! The engine never hands out references into its internals; it publishes
//! a fresh `GameState` value on every change, so consumers observe a
//! totally ordered stream of immutable snapshots.

use serde::{Deserialize, Serialize};

use super::mode::GameMode;

/// What the presentation layer should currently show.
///
/// Replaced wholesale on every change, never mutated in place by
/// consumers. Stimulus fields are `None` before the first reveal of a
/// round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// The selected game mode.
    pub mode: GameMode,

    /// Tile index currently lit, within `grid_size * grid_size`.
    pub visual_stimulus: Option<u32>,

    /// Letter index currently spoken.
    pub audio_stimulus: Option<u32>,

    /// Stimuli left in the round, counting down to 0.
    pub tiles_remaining: u32,

    /// Cleared by an incorrect visual judgement; reset at each step
    /// boundary. Drives transient "wrong press" feedback in the UI.
    pub visual_press_correct: bool,

    /// Symmetric flag for the audio channel.
    pub audio_press_correct: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            mode: GameMode::default(),
            visual_stimulus: None,
            audio_stimulus: None,
            tiles_remaining: 0,
            visual_press_correct: true,
            audio_press_correct: true,
        }
    }
}

impl GameState {
    /// The pre-round snapshot for a selected mode.
    #[must_use]
    pub fn idle(mode: GameMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}
