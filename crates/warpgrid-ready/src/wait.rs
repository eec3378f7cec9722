//! Readiness wait for a configured target.
//!
//! Glues a [`ReadyConfig`] to the probe for its [`Target`] and the retry
//! scheduler. This is the entry point the `warp-wait` binary uses.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::ReadyConfig;
use crate::error::{ReadyError, ReadyResult};
use crate::probe::Target;
use crate::scheduler::{ReadyReport, RetryScheduler};
use crate::tls::TlsConfig;

/// Block until `config.target` is reachable or the budget is spent.
///
/// When `config.attempt_timeout` is set every attempt is bounded by it;
/// otherwise a single attempt may run as long as the connect takes.
pub async fn wait_for(
    config: &ReadyConfig,
    cancel: Option<watch::Receiver<bool>>,
) -> ReadyResult<ReadyReport> {
    let mut scheduler = RetryScheduler::from_config(config)?;
    if let Some(cancel) = cancel {
        scheduler = scheduler.with_cancellation(cancel);
    }

    let target = Arc::new(Target::parse(&config.target)?);
    let tls = tls_for(&target, config)?;
    info!(
        %target,
        timeout = ?config.timeout,
        interval = ?config.interval,
        attempt_timeout = ?config.attempt_timeout,
        "attempting to connect (will try for {:?}, {:?} between attempts)",
        config.timeout,
        config.interval,
    );

    if let Some(attempt_timeout) = config.attempt_timeout {
        if attempt_timeout > config.interval {
            warn!(
                ?attempt_timeout,
                interval = ?config.interval,
                "attempt timeout exceeds retry interval; a slow attempt may overrun the total timeout"
            );
        }
    }

    let probe = move || {
        let target = target.clone();
        let tls = tls.clone();
        async move { target.probe(tls.as_ref()).await }
    };

    match config.attempt_timeout {
        Some(attempt_timeout) => scheduler.run_bounded(probe, attempt_timeout).await,
        None => scheduler.run(probe).await,
    }
}

/// Trust roots for an `https` target, loaded once before the first attempt.
fn tls_for(target: &Target, config: &ReadyConfig) -> ReadyResult<Option<TlsConfig>> {
    if !target.is_tls() {
        return Ok(None);
    }
    let tls = match &config.ca_cert {
        Some(path) => TlsConfig::from_pem_file(path),
        None => TlsConfig::with_webpki_roots(),
    };
    tls.map(Some)
        .map_err(|e| ReadyError::Config(format!("{e:#}")))
}
