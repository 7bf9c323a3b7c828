//! Bookkeeping for a single round in progress.
//!
//! `Round` is the synchronous core the engine drives: one shared event
//! counter across modalities, the score, and one judgement cursor per
//! modality. All mutation goes through the engine's single lock, so the
//! cursor update and the score change of a judgement are atomic with
//! respect to concurrent input.

use crate::core::{GameMode, Sequence};

/// One of the two stimulus channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Modality {
    Visual,
    Audio,
}

/// Outcome of one match-button press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Judgement {
    /// The current stimulus matches the one n steps back; score +1.
    Correct,
    /// No match; score -1, floored at 0.
    Incorrect,
    /// The press did not count: modality inactive, not enough history,
    /// round finished, or this event was already judged.
    Ignored,
}

/// Live state of one round.
///
/// Sequences are generated once at round start and owned here until the
/// round ends; the event counter only moves forward.
#[derive(Clone, Debug)]
pub struct Round {
    mode: GameMode,
    n_back: usize,
    length: usize,
    visual: Option<Sequence>,
    audio: Option<Sequence>,
    event_counter: usize,
    score: u32,
    visual_judged: Option<usize>,
    audio_judged: Option<usize>,
    finished: bool,
}

impl Round {
    /// Start a round over the given sequences.
    ///
    /// A sequence must be present exactly for the modalities `mode`
    /// activates, and present sequences must share one length.
    #[must_use]
    pub fn new(
        mode: GameMode,
        n_back: usize,
        visual: Option<Sequence>,
        audio: Option<Sequence>,
    ) -> Self {
        debug_assert_eq!(mode.has_visual(), visual.is_some());
        debug_assert_eq!(mode.has_audio(), audio.is_some());

        let length = visual
            .as_ref()
            .or(audio.as_ref())
            .map(Sequence::len)
            .unwrap_or(0);
        if let (Some(v), Some(a)) = (&visual, &audio) {
            debug_assert_eq!(v.len(), a.len());
        }

        Self {
            mode,
            n_back,
            length,
            visual,
            audio,
            event_counter: 0,
            score: 0,
            visual_judged: None,
            audio_judged: None,
            finished: false,
        }
    }

    /// The mode this round was started with.
    #[must_use]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Number of stimuli in the round.
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Index of the event currently presented.
    #[must_use]
    pub fn event_counter(&self) -> usize {
        self.event_counter
    }

    /// Current score.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Stimuli left, counting the current one.
    #[must_use]
    pub fn tiles_remaining(&self) -> u32 {
        (self.length - self.event_counter.min(self.length)) as u32
    }

    /// Has the final stimulus interval elapsed?
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The stimulus value currently presented on a channel.
    ///
    /// `None` when the channel is inactive or the round has finished.
    #[must_use]
    pub fn current_stimulus(&self, modality: Modality) -> Option<u32> {
        if self.finished {
            return None;
        }
        self.sequence(modality)?.get(self.event_counter)
    }

    /// Judge a match press on a channel against the value n steps back.
    ///
    /// The judgement window for one event closes after the first press on
    /// that channel, whatever its outcome; a second press on the same
    /// event is [`Judgement::Ignored`]. Presses before `n_back` events of
    /// history exist, on an inactive channel, or after the round finished
    /// are ignored too.
    pub fn judge(&mut self, modality: Modality) -> Judgement {
        if self.finished || self.event_counter >= self.length {
            return Judgement::Ignored;
        }
        if self.event_counter < self.n_back {
            return Judgement::Ignored;
        }
        let Some(sequence) = self.sequence(modality) else {
            return Judgement::Ignored;
        };
        let current = sequence.get(self.event_counter);
        let earlier = sequence.get(self.event_counter - self.n_back);

        let cursor = match modality {
            Modality::Visual => &mut self.visual_judged,
            Modality::Audio => &mut self.audio_judged,
        };
        if *cursor == Some(self.event_counter) {
            return Judgement::Ignored;
        }
        *cursor = Some(self.event_counter);

        if current == earlier {
            self.score += 1;
            Judgement::Correct
        } else {
            self.score = self.score.saturating_sub(1);
            Judgement::Incorrect
        }
    }

    /// Advance the shared event counter after a stimulus interval.
    ///
    /// Marks the round finished once the counter reaches the length.
    pub fn advance(&mut self) {
        if self.event_counter < self.length {
            self.event_counter += 1;
        }
        if self.event_counter >= self.length {
            self.finished = true;
        }
    }

    fn sequence(&self, modality: Modality) -> Option<&Sequence> {
        match modality {
            Modality::Visual => self.visual.as_ref(),
            Modality::Audio => self.audio.as_ref(),
        }
    }
}
