//! Round orchestration: the engine the presentation layer talks to.
//!
//! ## Architecture
//!
//! - **Single writer**: all round data (score, counter, judgement cursors)
//!   lives behind one lock; the reveal task and the consumer-facing entry
//!   points mutate it only through that lock.
//! - **Observable snapshots**: consumers subscribe to `watch` channels and
//!   receive immutable values; they never hold a lock.
//! - **Cancellable rounds**: each `start_game` bumps a round generation
//!   and aborts the previous reveal task. A stale task that wakes up
//!   observes the generation mismatch under the lock and publishes
//!   nothing.
//!
//! The reveal loop publishes the stimulus for an event, sleeps the
//! configured interval, then advances the shared event counter. In
//! audio-visual mode both stimuli travel in the same snapshot each step,
//! so the two channels cannot drift apart.

pub mod round;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

use crate::core::{
    GameMode, GameRng, GameState, RoundConfig, SequenceGenerator, MATCH_PERCENTAGE,
};
use crate::settings::{SettingsSnapshot, SettingsStore, StorageError};

pub use round::{Judgement, Modality, Round};

/// The n-back game engine.
///
/// Owns the live round, the configuration, and the observable streams.
/// Constructed with a [`SettingsStore`]; reads it once and caches the
/// values, writing back on `save_settings` and on new highscores.
///
/// `start_game` spawns the reveal loop on the ambient Tokio runtime, so
/// the engine must be created and driven inside one.
pub struct GameEngine {
    store: Arc<dyn SettingsStore>,
    state: Arc<Mutex<EngineState>>,
    streams: Arc<Streams>,
}

struct EngineState {
    config: RoundConfig,
    mode: GameMode,
    round: Option<Round>,
    /// Source of per-round seeds.
    seed_rng: GameRng,
    /// Bumped on every `start_game`; stale reveal tasks check it before
    /// every publication.
    generation: u64,
    task: Option<JoinHandle<()>>,
}

/// One watch sender per observable value.
struct Streams {
    game_state: watch::Sender<GameState>,
    score: watch::Sender<u32>,
    highscore: watch::Sender<u32>,
    event_counter: watch::Sender<u32>,
    n_back: watch::Sender<u32>,
    event_interval: watch::Sender<Duration>,
    nr_of_events: watch::Sender<u32>,
    grid_size: watch::Sender<u32>,
    nr_of_spoken_letters: watch::Sender<u32>,
}

impl GameEngine {
    /// Create an engine, loading settings from the store.
    ///
    /// A load failure is logged and degrades to defaults; the engine
    /// never starts in a partially configured state.
    pub async fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self::build(store, GameRng::from_entropy()).await
    }

    /// Create an engine whose rounds derive deterministically from `seed`.
    ///
    /// Every round still gets its own sequences; the same seed replays
    /// the same rounds. Used by tests and replay tooling.
    pub async fn with_seed(store: Arc<dyn SettingsStore>, seed: u64) -> Self {
        Self::build(store, GameRng::new(seed)).await
    }

    async fn build(store: Arc<dyn SettingsStore>, seed_rng: GameRng) -> Self {
        let snapshot = match store.load().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(%err, "settings load failed, falling back to defaults");
                SettingsSnapshot::default()
            }
        };
        let config = snapshot.config.sanitized();

        let streams = Arc::new(Streams {
            game_state: watch::channel(GameState::default()).0,
            score: watch::channel(0).0,
            highscore: watch::channel(snapshot.highscore).0,
            event_counter: watch::channel(0).0,
            n_back: watch::channel(config.n_back()).0,
            event_interval: watch::channel(config.stimulus_interval()).0,
            nr_of_events: watch::channel(config.round_length()).0,
            grid_size: watch::channel(config.grid_size()).0,
            nr_of_spoken_letters: watch::channel(config.spoken_letters()).0,
        });

        Self {
            store,
            state: Arc::new(Mutex::new(EngineState {
                config,
                mode: GameMode::default(),
                round: None,
                seed_rng,
                generation: 0,
                task: None,
            })),
            streams,
        }
    }

    // === Streams ===

    /// Snapshot stream of what to present.
    pub fn game_state(&self) -> watch::Receiver<GameState> {
        self.streams.game_state.subscribe()
    }

    /// Current round score.
    pub fn score(&self) -> watch::Receiver<u32> {
        self.streams.score.subscribe()
    }

    /// Best round score seen so far.
    pub fn highscore(&self) -> watch::Receiver<u32> {
        self.streams.highscore.subscribe()
    }

    /// Shared event counter, monotonic within a round.
    pub fn event_counter(&self) -> watch::Receiver<u32> {
        self.streams.event_counter.subscribe()
    }

    /// Configured n-back depth.
    pub fn n_back(&self) -> watch::Receiver<u32> {
        self.streams.n_back.subscribe()
    }

    /// Configured inter-stimulus interval.
    pub fn event_interval(&self) -> watch::Receiver<Duration> {
        self.streams.event_interval.subscribe()
    }

    /// Configured stimuli per round.
    pub fn nr_of_events(&self) -> watch::Receiver<u32> {
        self.streams.nr_of_events.subscribe()
    }

    /// Configured visual grid side length.
    pub fn grid_size(&self) -> watch::Receiver<u32> {
        self.streams.grid_size.subscribe()
    }

    /// Configured spoken-letter alphabet size.
    pub fn nr_of_spoken_letters(&self) -> watch::Receiver<u32> {
        self.streams.nr_of_spoken_letters.subscribe()
    }

    // === Entry points ===

    /// Select the mode for subsequent rounds.
    ///
    /// The published snapshot's `mode` updates immediately; a round
    /// already running keeps judging under the mode it started with.
    pub fn set_game_type(&self, mode: GameMode) {
        self.lock_state().mode = mode;
        self.streams.game_state.send_modify(|s| s.mode = mode);
    }

    /// Start a round, cancelling any round in flight.
    ///
    /// Resets score, counters and judgement cursors, generates one
    /// sequence per active modality at the fixed match density, publishes
    /// the initial snapshot and spawns the reveal loop.
    pub fn start_game(&self) {
        let mut state = self.lock_state();
        state.generation += 1;
        let generation = state.generation;
        if let Some(task) = state.task.take() {
            task.abort();
        }

        let config = state.config.clone();
        let mode = state.mode;
        let n_back = config.n_back() as usize;
        let length = config.round_length() as usize;

        let round_seed = state.seed_rng.next_u64();
        let round_rng = GameRng::new(round_seed);
        let visual = mode.has_visual().then(|| {
            SequenceGenerator::from_rng(round_rng.for_context("visual"))
                .generate(length, config.visual_alphabet(), MATCH_PERCENTAGE, n_back)
                .expect("round config satisfies generator preconditions")
        });
        let audio = mode.has_audio().then(|| {
            SequenceGenerator::from_rng(round_rng.for_context("audio"))
                .generate(length, config.spoken_letters(), MATCH_PERCENTAGE, n_back)
                .expect("round config satisfies generator preconditions")
        });
        debug!(seed = round_seed, %mode, n_back, length, "starting round");

        state.round = Some(Round::new(mode, n_back, visual, audio));

        self.streams.score.send_replace(0);
        self.streams.event_counter.send_replace(0);
        self.streams.game_state.send_replace(GameState {
            mode,
            tiles_remaining: config.round_length(),
            ..GameState::default()
        });

        state.task = Some(tokio::spawn(run_reveal_loop(
            Arc::clone(&self.state),
            Arc::clone(&self.streams),
            Arc::clone(&self.store),
            generation,
            length,
            config.stimulus_interval(),
        )));
    }

    /// Judge a visual match press.
    pub fn check_match_visual(&self) {
        self.check_match(Modality::Visual);
    }

    /// Judge an audio match press.
    pub fn check_match_audio(&self) {
        self.check_match(Modality::Audio);
    }

    fn check_match(&self, modality: Modality) {
        let (judgement, score) = {
            let mut state = self.lock_state();
            match state.round.as_mut() {
                Some(round) => {
                    let judgement = round.judge(modality);
                    (judgement, round.score())
                }
                // No round yet: nothing to judge.
                None => (Judgement::Ignored, 0),
            }
        };

        match judgement {
            Judgement::Correct => {
                self.streams.score.send_replace(score);
            }
            Judgement::Incorrect => {
                self.streams.score.send_replace(score);
                self.streams.game_state.send_modify(|s| match modality {
                    Modality::Visual => s.visual_press_correct = false,
                    Modality::Audio => s.audio_press_correct = false,
                });
            }
            Judgement::Ignored => {}
        }
        trace!(?modality, ?judgement, score, "match press judged");
    }

    // === Configuration ===

    /// Set the n-back depth for subsequent rounds.
    pub fn set_n_back(&self, n_back: u32) {
        let mut state = self.lock_state();
        if state.config.set_n_back(n_back) {
            self.streams.n_back.send_replace(state.config.n_back());
            self.streams
                .nr_of_events
                .send_replace(state.config.round_length());
        } else {
            debug!(n_back, "rejected out-of-range n-back");
        }
    }

    /// Set the inter-stimulus interval for subsequent rounds.
    pub fn set_event_interval(&self, interval: Duration) {
        let mut state = self.lock_state();
        if state.config.set_stimulus_interval(interval) {
            self.streams
                .event_interval
                .send_replace(state.config.stimulus_interval());
        } else {
            debug!(?interval, "rejected zero stimulus interval");
        }
    }

    /// Set the number of stimuli per round for subsequent rounds.
    pub fn set_nr_of_events(&self, nr_of_events: u32) {
        let mut state = self.lock_state();
        if state.config.set_round_length(nr_of_events) {
            self.streams
                .nr_of_events
                .send_replace(state.config.round_length());
            self.streams.n_back.send_replace(state.config.n_back());
        } else {
            debug!(nr_of_events, "rejected zero round length");
        }
    }

    /// Set the visual grid side length for subsequent rounds.
    pub fn set_grid_size(&self, grid_size: u32) {
        let mut state = self.lock_state();
        if state.config.set_grid_size(grid_size) {
            self.streams.grid_size.send_replace(state.config.grid_size());
        } else {
            debug!(grid_size, "rejected zero grid size");
        }
    }

    /// Set the spoken-letter alphabet size for subsequent rounds.
    pub fn set_nr_of_spoken_letters(&self, nr_of_spoken_letters: u32) {
        let mut state = self.lock_state();
        if state.config.set_spoken_letters(nr_of_spoken_letters) {
            self.streams
                .nr_of_spoken_letters
                .send_replace(state.config.spoken_letters());
        } else {
            debug!(nr_of_spoken_letters, "rejected zero spoken-letter count");
        }
    }

    /// Persist the current configuration through the settings store.
    ///
    /// Unlike highscore persistence this surfaces the error: the caller
    /// is an explicit settings screen that can retry or inform the user.
    pub async fn save_settings(&self) -> Result<(), StorageError> {
        let config = self.lock_state().config.clone();
        self.store.save_config(&config).await
    }

    /// Is a round currently in progress?
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lock_state()
            .round
            .as_ref()
            .is_some_and(|round| !round.is_finished())
    }

    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().expect("engine state poisoned")
    }
}

impl Drop for GameEngine {
    fn drop(&mut self) {
        if let Some(task) = self.lock_state().task.take() {
            task.abort();
        }
    }
}

/// The timed reveal loop for one round generation.
///
/// Publishes the stimulus for each event, waits the interval, advances
/// the shared counter, and finalizes the highscore when the last interval
/// elapses. Every publication happens under the state lock after a
/// generation check, so a cancelled round cannot publish late.
async fn run_reveal_loop(
    state: Arc<Mutex<EngineState>>,
    streams: Arc<Streams>,
    store: Arc<dyn SettingsStore>,
    generation: u64,
    length: usize,
    interval: Duration,
) {
    for _ in 0..length {
        {
            let guard = state.lock().expect("engine state poisoned");
            if guard.generation != generation {
                return;
            }
            let Some(round) = guard.round.as_ref() else {
                return;
            };
            let visual = round.current_stimulus(Modality::Visual);
            let audio = round.current_stimulus(Modality::Audio);
            streams.game_state.send_modify(|s| {
                if visual.is_some() {
                    s.visual_stimulus = visual;
                }
                if audio.is_some() {
                    s.audio_stimulus = audio;
                }
            });
        }

        tokio::time::sleep(interval).await;

        {
            let mut guard = state.lock().expect("engine state poisoned");
            if guard.generation != generation {
                return;
            }
            let Some(round) = guard.round.as_mut() else {
                return;
            };
            round.advance();
            streams
                .event_counter
                .send_replace(round.event_counter() as u32);
            let tiles_remaining = round.tiles_remaining();
            streams.game_state.send_modify(|s| {
                s.tiles_remaining = tiles_remaining;
                s.visual_press_correct = true;
                s.audio_press_correct = true;
            });
        }
    }

    let final_score = {
        let guard = state.lock().expect("engine state poisoned");
        if guard.generation != generation {
            return;
        }
        match guard.round.as_ref() {
            Some(round) => round.score(),
            None => return,
        }
    };

    let highscore = *streams.highscore.borrow();
    if final_score > highscore {
        debug!(final_score, highscore, "round ended with a new highscore");
        if let Err(err) = store.save_highscore(final_score).await {
            // A storage fault must not take down a finished round.
            error!(%err, "failed to persist highscore");
        }
        streams.highscore.send_replace(final_score);
    } else {
        debug!(final_score, highscore, "round ended");
    }
}
