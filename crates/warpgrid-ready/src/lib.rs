//! warpgrid-ready — block until a dependency is reachable.
//!
//! Repeatedly probes a target until it answers or an overall time budget
//! runs out. Each attempt can additionally be bounded by a shorter
//! per-attempt deadline so one stuck connect cannot stall the loop.
//!
//! # Architecture
//!
//! ```text
//! wait_for(ReadyConfig)
//!   └── RetryScheduler (total timeout, fixed interval, cancellation)
//!       ├── RetryBudget (elapsed vs. total, capped sleeps)
//!       └── probe per attempt
//!           ├── with_deadline() → races the attempt against a timer
//!           └── Target::probe() → http_probe() (+ TlsConfig) | tcp_probe()
//! ```
//!
//! Attempts are strictly sequential. Each one runs on its own task so a
//! panic is contained; an attempt abandoned at its deadline or on
//! cancellation may finish later and its result is discarded.

pub mod budget;
pub mod config;
pub mod deadline;
pub mod error;
pub mod probe;
pub mod scheduler;
pub mod tls;
pub mod wait;

pub use budget::{Attempt, RetryBudget};
pub use config::{ReadyConfig, ReadyFile, parse_duration};
pub use deadline::with_deadline;
pub use error::{AttemptError, ReadyError, ReadyResult};
pub use probe::{Credentials, HttpTarget, Target, http_probe, tcp_probe};
pub use scheduler::{ReadyReport, RetryScheduler};
pub use tls::TlsConfig;
pub use wait::wait_for;
