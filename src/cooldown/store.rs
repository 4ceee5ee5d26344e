//! Persistence backends for the last scale action timestamp.

use super::CooldownError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

/// Durable home of the last-action timestamp, in seconds since the Unix epoch.
pub trait CooldownStore: Send + Sync {
    /// `Ok(None)` when no action was ever recorded.
    fn read(&self) -> Result<Option<f64>, CooldownError>;

    fn write(&self, timestamp: f64) -> Result<(), CooldownError>;

    /// Current time on the same scale as stored timestamps.
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// Single text file holding the timestamp as a decimal number.
///
/// Writes go to a temporary file in the same directory which is then renamed over
/// the target, so readers see either the old or the new value.
#[derive(Debug, Clone)]
pub struct FileCooldownStore {
    path: PathBuf,
}

impl FileCooldownStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CooldownStore for FileCooldownStore {
    fn read(&self) -> Result<Option<f64>, CooldownError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => parse_timestamp(&content).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, timestamp: f64) -> Result<(), CooldownError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        write!(file, "{}", timestamp)?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

fn parse_timestamp(raw: &str) -> Result<f64, CooldownError> {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CooldownError::Parse(trimmed.to_string())),
    }
}

/// In-process store with a settable clock.
#[derive(Debug, Default)]
pub struct MemoryCooldownStore {
    last: Mutex<Option<f64>>,
    now: Mutex<f64>,
    failing: Mutex<bool>,
}

impl MemoryCooldownStore {
    /// Store whose clock reads `now` until moved.
    pub fn at(now: f64) -> Self {
        Self {
            now: Mutex::new(now),
            ..Default::default()
        }
    }

    pub fn set_now(&self, now: f64) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, seconds: f64) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) += seconds;
    }

    pub fn set_last(&self, timestamp: Option<f64>) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = timestamp;
    }

    pub fn last(&self) -> Option<f64> {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every read and write fail with an I/O error.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap_or_else(PoisonError::into_inner) = failing;
    }

    fn check_failing(&self) -> Result<(), CooldownError> {
        if *self.failing.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(CooldownError::Io(std::io::Error::other(
                "memory store configured to fail",
            )));
        }
        Ok(())
    }
}

impl CooldownStore for MemoryCooldownStore {
    fn read(&self) -> Result<Option<f64>, CooldownError> {
        self.check_failing()?;
        Ok(self.last())
    }

    fn write(&self, timestamp: f64) -> Result<(), CooldownError> {
        self.check_failing()?;
        self.set_last(Some(timestamp));
        Ok(())
    }

    fn now(&self) -> f64 {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
