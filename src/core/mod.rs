//! Core engine types: modes, configuration, state snapshots, sequences, RNG.
//!
//! This module contains the fundamental building blocks that are free of
//! any presentation or persistence concern. The presentation layer
//! configures rounds via `RoundConfig` and observes `GameState` snapshots;
//! it never touches these types' internals mid-round.

pub mod config;
pub mod mode;
pub mod rng;
pub mod sequence;
pub mod state;

pub use config::{RoundConfig, MATCH_PERCENTAGE, MAX_N_BACK};
pub use mode::GameMode;
pub use rng::GameRng;
pub use sequence::{GenerateError, Sequence, SequenceGenerator};
pub use state::GameState;
