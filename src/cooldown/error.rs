//! Cooldown store errors.

use thiserror::Error;

/// Failure to read or persist the last-action timestamp.
///
/// Never escapes [`CooldownTracker`](super::CooldownTracker): reads fail open and
/// writes are logged.
#[derive(Error, Debug)]
pub enum CooldownError {
    #[error("cooldown store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cooldown timestamp '{0}' is not a number of seconds")]
    Parse(String),
}
