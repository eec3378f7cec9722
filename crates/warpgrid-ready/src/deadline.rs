//! Per-attempt deadlines.
//!
//! [`with_deadline`] runs an operation on its own task and races the task's
//! `JoinHandle` against a timer. If the timer wins, the caller gets
//! [`AttemptError::DeadlineExceeded`] straight away and the operation is
//! abandoned, not aborted: an in-flight connect may still finish later.
//!
//! The `JoinHandle` is the single result slot. The task writes it once by
//! returning, and the race consumes the handle, so it is read at most once.
//! When the deadline fires first the handle is dropped, which detaches the
//! task; its eventual result is dropped on the operation's own task.

use std::any::Any;
use std::future::Future;
use std::time::Duration;

use tokio::task::JoinError;
use tracing::debug;

use crate::error::AttemptError;

/// Run `operation` with a hard deadline.
///
/// Returns the operation's own result if it completes first, or
/// [`AttemptError::DeadlineExceeded`] if `timeout` elapses first. The caller
/// never waits past `timeout`. A panic inside `operation` is reported as
/// [`AttemptError::Panicked`] carrying the panic message.
pub async fn with_deadline<F, T>(operation: F, timeout: Duration) -> Result<T, AttemptError>
where
    F: Future<Output = anyhow::Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::spawn(operation);

    match tokio::time::timeout(timeout, handle).await {
        Ok(joined) => settle(joined),
        Err(_) => {
            debug!(?timeout, "operation abandoned at its deadline");
            Err(AttemptError::DeadlineExceeded(timeout))
        }
    }
}

/// Flatten a joined attempt task into an attempt result.
pub(crate) fn settle<T, E>(joined: Result<Result<T, E>, JoinError>) -> Result<T, AttemptError>
where
    E: Into<AttemptError>,
{
    match joined {
        Ok(result) => result.map_err(Into::into),
        Err(err) if err.is_panic() => Err(AttemptError::Panicked(panic_message(err.into_panic()))),
        Err(err) => Err(AttemptError::Failed(anyhow::anyhow!("attempt task cancelled: {err}"))),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(msg) => *msg,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "non-string panic payload".to_string(),
        },
    }
}
