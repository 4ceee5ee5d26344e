//! Cooldown tracking between scale actions.
//!
//! The timestamp of the last executed scale action lives in a [`CooldownStore`]
//! outside process memory, so the window survives restarts. Reads fail open: a
//! missing or unreadable timestamp means scaling is allowed.
//!
//! Several autoscaler instances sharing one store race on it; there is no locking.

mod error;
mod store;

pub use error::CooldownError;
pub use store::{CooldownStore, FileCooldownStore, MemoryCooldownStore};

use std::path::PathBuf;
use std::sync::Arc;

/// Checks and records the cooldown window.
#[derive(Clone)]
pub struct CooldownTracker {
    store: Arc<dyn CooldownStore>,
    cooldown_seconds: u64,
}

impl CooldownTracker {
    pub fn new(store: Arc<dyn CooldownStore>, cooldown_seconds: u64) -> Self {
        Self {
            store,
            cooldown_seconds,
        }
    }

    /// Tracker persisting to a file.
    pub fn file(path: impl Into<PathBuf>, cooldown_seconds: u64) -> Self {
        Self::new(Arc::new(FileCooldownStore::new(path)), cooldown_seconds)
    }

    pub fn cooldown_seconds(&self) -> u64 {
        self.cooldown_seconds
    }

    /// Epoch seconds of the last recorded action, if one can be read.
    pub fn last_action(&self) -> Option<f64> {
        self.store.read().ok().flatten()
    }

    /// Whole seconds since the last recorded action, if one can be read.
    ///
    /// Negative when the stored timestamp lies in the future.
    pub fn seconds_since_last_action(&self) -> Option<i64> {
        match self.store.read() {
            Ok(Some(last)) => Some((self.store.now() - last).floor() as i64),
            Ok(None) => {
                tracing::debug!("No scale action recorded yet");
                None
            }
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    "Unable to read cooldown state, will scale anyway"
                );
                None
            }
        }
    }

    pub fn is_cooling_down(&self) -> bool {
        self.remaining_seconds().is_some()
    }

    /// Seconds left in the window, or None when scaling is allowed.
    pub fn remaining_seconds(&self) -> Option<u64> {
        let elapsed = self.seconds_since_last_action()?;
        let window = i64::try_from(self.cooldown_seconds).unwrap_or(i64::MAX);
        if elapsed < window {
            tracing::debug!(
                elapsed_seconds = elapsed,
                cooldown_seconds = self.cooldown_seconds,
                "Inside cooldown window"
            );
            Some(window.saturating_sub(elapsed) as u64)
        } else {
            tracing::debug!(
                elapsed_seconds = elapsed,
                cooldown_seconds = self.cooldown_seconds,
                "No need to cool down"
            );
            None
        }
    }

    /// Stamp the current time as the last action. Failures are logged only.
    pub fn record_action(&self) {
        let now = self.store.now();
        if let Err(error) = self.store.write(now) {
            tracing::warn!(
                error = %error,
                "Unable to record scale action time, cooldown will not apply next cycle"
            );
        }
    }
}

impl std::fmt::Debug for CooldownTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CooldownTracker")
            .field("cooldown_seconds", &self.cooldown_seconds)
            .finish_non_exhaustive()
    }
}
