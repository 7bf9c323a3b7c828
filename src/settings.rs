//! Settings persistence boundary.
//!
//! The engine reads one [`SettingsSnapshot`] at construction and writes
//! back through explicit save calls. How and where the snapshot is stored
//! is the implementor's concern; the engine only sees the trait. A read
//! failure degrades to defaults, a highscore write failure is logged and
//! absorbed, and a config write failure propagates to the caller.

use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::RoundConfig;

/// Settings storage failure.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The backing store could not be read or written.
    #[error("settings storage unavailable: {0}")]
    Unavailable(String),
}

/// Everything the engine persists.
///
/// Missing fields deserialize to their defaults, so a snapshot written by
/// an older version (or a partially corrupt one) degrades field by field
/// instead of failing wholesale.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsSnapshot {
    /// Best round score seen so far.
    pub highscore: u32,
    /// Round parameters as last saved.
    pub config: RoundConfig,
}

/// Persistence interface consumed by the engine.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read the persisted snapshot.
    async fn load(&self) -> Result<SettingsSnapshot, StorageError>;

    /// Persist a new highscore.
    async fn save_highscore(&self, highscore: u32) -> Result<(), StorageError>;

    /// Persist the current round configuration.
    async fn save_config(&self, config: &RoundConfig) -> Result<(), StorageError>;
}

/// In-memory store: the default when no persistence is wired up, and the
/// workhorse of the engine tests.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    snapshot: Mutex<SettingsSnapshot>,
}

impl MemorySettingsStore {
    /// Create an empty store (defaults on first load).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a snapshot.
    #[must_use]
    pub fn with_snapshot(snapshot: SettingsSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
        }
    }

    /// The snapshot as currently stored.
    #[must_use]
    pub fn snapshot(&self) -> SettingsSnapshot {
        self.snapshot.lock().expect("settings store poisoned").clone()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<SettingsSnapshot, StorageError> {
        Ok(self.snapshot())
    }

    async fn save_highscore(&self, highscore: u32) -> Result<(), StorageError> {
        self.snapshot
            .lock()
            .expect("settings store poisoned")
            .highscore = highscore;
        Ok(())
    }

    async fn save_config(&self, config: &RoundConfig) -> Result<(), StorageError> {
        self.snapshot
            .lock()
            .expect("settings store poisoned")
            .config = config.clone();
        Ok(())
    }
}
