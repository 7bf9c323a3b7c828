//! Game modes: which stimulus channels are active in a round.

use serde::{Deserialize, Serialize};

/// The stimulus channels a round presents and judges.
///
/// Determines which sequences are generated at round start and which match
/// buttons the presentation layer should enable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// Tile positions only.
    #[default]
    Visual,
    /// Spoken letters only.
    Audio,
    /// Both channels in lockstep on one shared event counter.
    AudioVisual,
}

impl GameMode {
    /// Does this mode present visual stimuli?
    #[must_use]
    pub fn has_visual(self) -> bool {
        matches!(self, GameMode::Visual | GameMode::AudioVisual)
    }

    /// Does this mode present audio stimuli?
    #[must_use]
    pub fn has_audio(self) -> bool {
        matches!(self, GameMode::Audio | GameMode::AudioVisual)
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameMode::Visual => write!(f, "visual"),
            GameMode::Audio => write!(f, "audio"),
            GameMode::AudioVisual => write!(f, "audio-visual"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_gating() {
        assert!(GameMode::Visual.has_visual());
        assert!(!GameMode::Visual.has_audio());

        assert!(!GameMode::Audio.has_visual());
        assert!(GameMode::Audio.has_audio());

        assert!(GameMode::AudioVisual.has_visual());
        assert!(GameMode::AudioVisual.has_audio());
    }

    #[test]
    fn test_default_is_visual() {
        assert_eq!(GameMode::default(), GameMode::Visual);
    }

    #[test]
    fn test_display() {
        assert_eq!(GameMode::AudioVisual.to_string(), "audio-visual");
    }
}
