//! Error types for readiness probing.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for readiness operations.
pub type ReadyResult<T> = Result<T, ReadyError>;

/// Terminal errors returned to the caller of a retry session.
#[derive(Debug, Error)]
pub enum ReadyError {
    /// Invalid timeout, interval, or target. No attempt was made.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The retry budget ran out. Wraps the most recent attempt failure.
    #[error("gave up after retrying for {elapsed:?} ({attempts} attempts): {last}")]
    Exhausted {
        elapsed: Duration,
        attempts: u32,
        #[source]
        last: AttemptError,
    },

    /// The cancellation signal fired before the target became reachable.
    #[error("cancelled after {elapsed:?} ({attempts} attempts)")]
    Cancelled { elapsed: Duration, attempts: u32 },
}

impl ReadyError {
    /// The last attempt failure, if the session ended by exhaustion.
    pub fn last_attempt(&self) -> Option<&AttemptError> {
        match self {
            ReadyError::Exhausted { last, .. } => Some(last),
            _ => None,
        }
    }
}

/// Why a single attempt did not succeed.
///
/// The scheduler treats every variant the same way (sleep and retry); the
/// distinction only matters for logging and diagnostics.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// The per-attempt deadline fired before the operation completed.
    #[error("deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),

    /// The operation itself reported a failure.
    #[error("{0:#}")]
    Failed(anyhow::Error),

    /// The operation's task panicked.
    #[error("probe panicked: {0}")]
    Panicked(String),
}

impl AttemptError {
    /// Whether this failure came from the per-attempt deadline.
    pub fn is_deadline(&self) -> bool {
        matches!(self, AttemptError::DeadlineExceeded(_))
    }
}

impl From<anyhow::Error> for AttemptError {
    fn from(err: anyhow::Error) -> Self {
        AttemptError::Failed(err)
    }
}
