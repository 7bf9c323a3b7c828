//! # nback-engine
//!
//! The game core of an n-back cognitive trainer: a sequence of tile
//! positions and/or spoken letters is presented at a fixed cadence, and
//! the player indicates when the current stimulus matches the one exactly
//! n steps earlier.
//!
//! ## Design Principles
//!
//! 1. **Engine only**: rendering, audio playback, input devices and
//!    persistence technology live outside this crate. The engine consumes
//!    a [`SettingsStore`] and publishes immutable [`GameState`] snapshots;
//!    nothing else crosses the boundary.
//!
//! 2. **Single writer**: all live round data is owned by the engine and
//!    mutated under one lock. Consumers subscribe to watch channels and
//!    only ever read.
//!
//! 3. **Deterministic when asked**: sequences derive from seeds; a seeded
//!    engine replays identical rounds, and entropy-seeded engines are the
//!    default.
//!
//! ## Modules
//!
//! - `core`: game modes, round configuration, state snapshots, stimulus
//!   sequences and their generator, RNG
//! - `engine`: the `GameEngine` round orchestrator and per-round
//!   bookkeeping (event counter, score, judgement cursors)
//! - `settings`: the persistence boundary (`SettingsStore` trait,
//!   snapshot type, in-memory store)

pub mod core;
pub mod engine;
pub mod settings;

// Re-export commonly used types
pub use crate::core::{
    GameMode, GameRng, GameState, GenerateError, RoundConfig, Sequence, SequenceGenerator,
    MATCH_PERCENTAGE, MAX_N_BACK,
};

pub use crate::engine::{GameEngine, Judgement, Modality, Round};

pub use crate::settings::{MemorySettingsStore, SettingsSnapshot, SettingsStore, StorageError};
