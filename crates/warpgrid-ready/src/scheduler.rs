//! Bounded-retry loop.
//!
//! [`RetryScheduler`] calls a probe until it succeeds or the total timeout
//! runs out, sleeping a fixed interval between attempts. Attempts are
//! strictly sequential: attempt N+1 never starts before attempt N resolves.
//!
//! The first attempt always runs. Exhaustion is checked only after a failed
//! attempt and again after the inter-attempt sleep, which is cut short at
//! the budget deadline. A single slow attempt can therefore run past the
//! total timeout unless it is bounded with [`RetryScheduler::run_bounded`].
//!
//! Every attempt runs on its own task. A panicking probe becomes
//! [`AttemptError::Panicked`] and is retried like any other failure, and an
//! attempt interrupted by cancellation is detached rather than awaited.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::budget::{Attempt, RetryBudget};
use crate::config::{ReadyConfig, ensure_positive};
use crate::deadline::{settle, with_deadline};
use crate::error::{AttemptError, ReadyError, ReadyResult};

/// Summary of a successful session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyReport {
    /// Probe invocations, including the successful one.
    pub attempts: u32,
    /// Wall-clock time from session start to success.
    pub elapsed: Duration,
}

/// Drives a probe until it succeeds or the retry budget is spent.
#[derive(Debug, Clone)]
pub struct RetryScheduler {
    timeout: Duration,
    interval: Duration,
    cancel: Option<watch::Receiver<bool>>,
}

impl RetryScheduler {
    /// Create a scheduler. Both durations must be non-zero.
    pub fn new(timeout: Duration, interval: Duration) -> ReadyResult<Self> {
        ensure_positive("timeout", timeout)?;
        ensure_positive("interval", interval)?;
        Ok(Self {
            timeout,
            interval,
            cancel: None,
        })
    }

    /// Create a scheduler from a validated config.
    pub fn from_config(config: &ReadyConfig) -> ReadyResult<Self> {
        config.validate()?;
        Self::new(config.timeout, config.interval)
    }

    /// Abort the session as soon as `cancel` becomes `true`.
    ///
    /// Both the inter-attempt sleep and an in-flight attempt are abandoned.
    /// Dropping the sender without sending `true` never cancels.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Invoke `probe` until it succeeds or the total timeout elapses.
    ///
    /// On exhaustion the most recent attempt failure is returned inside
    /// [`ReadyError::Exhausted`].
    pub async fn run<P, Fut, E>(&self, mut probe: P) -> ReadyResult<ReadyReport>
    where
        P: FnMut() -> Fut,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<AttemptError> + Send + 'static,
    {
        let budget = RetryBudget::start(self.timeout, self.interval)?;
        let mut cancel = self.cancel.clone();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let attempt = Attempt::begin(attempts);
            debug!(attempt = attempt.number, "probing");

            let outcome: Result<(), AttemptError> = tokio::select! {
                joined = tokio::spawn(probe()) => settle(joined),
                _ = cancelled(&mut cancel) => {
                    return Err(cancelled_error(&budget, attempts));
                }
            };

            let last = match outcome {
                Ok(()) => {
                    let report = ReadyReport {
                        attempts,
                        elapsed: budget.elapsed(),
                    };
                    info!(attempts, elapsed = ?report.elapsed, "target reachable");
                    return Ok(report);
                }
                Err(err) => err,
            };

            debug!(
                attempt = attempt.number,
                took = ?attempt.elapsed(),
                deadline = last.is_deadline(),
                error = %last,
                "attempt failed"
            );

            if budget.is_exhausted() {
                return Err(exhausted_error(&budget, attempts, last));
            }

            tokio::select! {
                _ = tokio::time::sleep_until(budget.next_wake()) => {}
                _ = cancelled(&mut cancel) => {
                    return Err(cancelled_error(&budget, attempts));
                }
            }

            if budget.is_exhausted() {
                return Err(exhausted_error(&budget, attempts, last));
            }
        }
    }

    /// Like [`run`](Self::run), but each attempt is raced against
    /// `attempt_timeout` with [`with_deadline`].
    pub async fn run_bounded<P, Fut>(
        &self,
        mut probe: P,
        attempt_timeout: Duration,
    ) -> ReadyResult<ReadyReport>
    where
        P: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        ensure_positive("attempt timeout", attempt_timeout)?;
        self.run(move || with_deadline(probe(), attempt_timeout))
            .await
    }
}

/// Resolves once cancellation is requested; pends forever without a signal.
async fn cancelled(cancel: &mut Option<watch::Receiver<bool>>) {
    match cancel {
        Some(rx) => {
            if rx.wait_for(|requested| *requested).await.is_err() {
                // Sender gone without a request.
                std::future::pending::<()>().await;
            }
        }
        None => std::future::pending::<()>().await,
    }
}

fn exhausted_error(budget: &RetryBudget, attempts: u32, last: AttemptError) -> ReadyError {
    ReadyError::Exhausted {
        elapsed: budget.elapsed(),
        attempts,
        last,
    }
}

fn cancelled_error(budget: &RetryBudget, attempts: u32) -> ReadyError {
    info!(attempts, "readiness wait cancelled");
    ReadyError::Cancelled {
        elapsed: budget.elapsed(),
        attempts,
    }
}
