//! Clock state for a single retry session.

use std::time::Duration;

use tokio::time::Instant;

use crate::config::ensure_positive;
use crate::error::ReadyResult;

/// Wall-clock allowance for one retry session.
///
/// Created when a session starts and dropped when it returns. Exhaustion is
/// decided purely by comparing elapsed time against the total timeout; no
/// attempt counter is consulted.
#[derive(Debug, Clone, Copy)]
pub struct RetryBudget {
    start: Instant,
    total: Duration,
    interval: Duration,
}

impl RetryBudget {
    /// Start a budget now. Both durations must be non-zero.
    pub fn start(total: Duration, interval: Duration) -> ReadyResult<Self> {
        ensure_positive("timeout", total)?;
        ensure_positive("interval", interval)?;
        Ok(Self {
            start: Instant::now(),
            total,
            interval,
        })
    }

    /// Time since the session started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time left before the budget is exhausted (zero once exhausted).
    pub fn remaining(&self) -> Duration {
        self.total.saturating_sub(self.elapsed())
    }

    /// Whether no new attempt may be issued.
    pub fn is_exhausted(&self) -> bool {
        self.elapsed() >= self.total
    }

    /// Instant at which the budget runs out.
    pub fn deadline(&self) -> Instant {
        self.start + self.total
    }

    /// When the next attempt should start: one interval from now, capped at
    /// the budget deadline.
    pub fn next_wake(&self) -> Instant {
        (Instant::now() + self.interval).min(self.deadline())
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// One execution of the probe within a session.
#[derive(Debug, Clone, Copy)]
pub struct Attempt {
    /// 1-based attempt number.
    pub number: u32,
    pub started_at: Instant,
}

impl Attempt {
    pub fn begin(number: u32) -> Self {
        Self {
            number,
            started_at: Instant::now(),
        }
    }

    /// How long this attempt has been running.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}
