//! warp-wait — block until a dependency is reachable.
//!
//! Probes a target repeatedly until it answers or the overall timeout runs
//! out. Exits 0 once connected and non-zero when the budget is exhausted,
//! the configuration is invalid, or the wait is interrupted.
//!
//! # Usage
//!
//! ```text
//! warp-wait --timeout 2m --interval 1s http://elasticsearch:9200
//! warp-wait --attempt-timeout 500ms tcp://postgres:5432
//! warp-wait --ca-cert http_ca.crt https://elastic:changeme@es:9200
//! warp-wait --config ready.toml
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;
use warpgrid_ready::{ReadyConfig, ReadyFile};

#[derive(Parser, Debug)]
#[command(
    name = "warp-wait",
    about = "Wait until a service is reachable, retrying at a fixed interval",
    version
)]
struct Cli {
    /// Connection target: http(s)://[user:pass@]host:port[/path], host:port, or tcp://host:port
    target: Option<String>,

    /// Total amount of time to try (e.g. 60s, 2m) [default: 60s]
    #[arg(long)]
    timeout: Option<String>,

    /// Amount of time to wait between tries (e.g. 1s, 500ms) [default: 1s]
    #[arg(long)]
    interval: Option<String>,

    /// Upper bound on a single attempt; unbounded if unset
    #[arg(long)]
    attempt_timeout: Option<String>,

    /// PEM CA bundle trusted for https targets instead of the public roots
    #[arg(long)]
    ca_cert: Option<PathBuf>,

    /// TOML file with target/timeout/interval/attempt_timeout/ca_cert; flags win
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log every attempt
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Merge defaults, the optional config file, and flags, in that order.
    fn resolve(&self) -> anyhow::Result<ReadyConfig> {
        let file = match &self.config {
            Some(path) => ReadyFile::from_file(path)?,
            None => ReadyFile::default(),
        };
        let flags = ReadyFile {
            target: self.target.clone(),
            timeout: self.timeout.clone(),
            interval: self.interval.clone(),
            attempt_timeout: self.attempt_timeout.clone(),
            ca_cert: self
                .ca_cert
                .as_ref()
                .map(|path| path.display().to_string()),
        };
        Ok(ReadyConfig::try_from(file.merge(flags))?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("warn,warp_wait={level},warpgrid_ready={level}"))),
        )
        .init();

    let config = cli.resolve()?;

    // Ctrl-C aborts both the current attempt and the sleep between attempts.
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received");
            let _ = cancel_tx.send(true);
        }
    });

    let report = warpgrid_ready::wait_for(&config, Some(cancel_rx)).await?;

    info!(
        attempts = report.attempts,
        "connected in {:?}",
        truncate_to_millis(report.elapsed)
    );
    Ok(())
}

fn truncate_to_millis(d: Duration) -> Duration {
    Duration::from_millis(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
