//! Readiness configuration.
//!
//! Two layers: [`ReadyFile`] is the loosely-typed form read from TOML or
//! command-line flags (durations as strings like `"5s"`), and
//! [`ReadyConfig`] is the validated form handed to the scheduler.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ReadyError, ReadyResult};
use crate::probe::Target;

/// Default total budget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default fixed interval between attempts.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Unvalidated configuration, as written in a TOML file.
///
/// ```toml
/// target = "http://localhost:9200"
/// timeout = "2m"
/// interval = "1s"
/// attempt_timeout = "500ms"
/// ca_cert = "/etc/elasticsearch/certs/http_ca.crt"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadyFile {
    pub target: Option<String>,
    pub timeout: Option<String>,
    pub interval: Option<String>,
    pub attempt_timeout: Option<String>,
    /// PEM bundle trusted for `https` targets instead of the public roots.
    pub ca_cert: Option<String>,
}

impl ReadyFile {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: ReadyFile = toml::from_str(&content)?;
        Ok(file)
    }

    /// Layer `overrides` on top of `self`; any field set in `overrides` wins.
    pub fn merge(self, overrides: ReadyFile) -> ReadyFile {
        ReadyFile {
            target: overrides.target.or(self.target),
            timeout: overrides.timeout.or(self.timeout),
            interval: overrides.interval.or(self.interval),
            attempt_timeout: overrides.attempt_timeout.or(self.attempt_timeout),
            ca_cert: overrides.ca_cert.or(self.ca_cert),
        }
    }
}

/// Validated settings for one readiness session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyConfig {
    /// Connection target string, e.g. `http://localhost:9200`.
    pub target: String,
    /// Total wall-clock budget across all attempts.
    pub timeout: Duration,
    /// Fixed sleep between attempts.
    pub interval: Duration,
    /// Optional hard bound on a single attempt.
    pub attempt_timeout: Option<Duration>,
    /// CA bundle for `https` targets; the webpki roots are used if unset.
    pub ca_cert: Option<PathBuf>,
}

impl ReadyConfig {
    /// Config with default timeout and interval and no per-attempt bound.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            timeout: DEFAULT_TIMEOUT,
            interval: DEFAULT_INTERVAL,
            attempt_timeout: None,
            ca_cert: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = Some(attempt_timeout);
        self
    }

    pub fn with_ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert = Some(path.into());
        self
    }

    /// Check every value before any attempt is made.
    pub fn validate(&self) -> ReadyResult<()> {
        Target::parse(&self.target)?;

        ensure_positive("timeout", self.timeout)?;
        ensure_positive("interval", self.interval)?;
        if let Some(attempt_timeout) = self.attempt_timeout {
            ensure_positive("attempt timeout", attempt_timeout)?;
        }
        Ok(())
    }
}

/// Reject a zero duration. Shared by every constructor that takes one.
pub(crate) fn ensure_positive(name: &str, value: Duration) -> ReadyResult<()> {
    if value.is_zero() {
        return Err(ReadyError::Config(format!("{name} must be positive")));
    }
    Ok(())
}

impl TryFrom<ReadyFile> for ReadyConfig {
    type Error = ReadyError;

    fn try_from(file: ReadyFile) -> ReadyResult<Self> {
        let target = file.target.ok_or_else(|| {
            ReadyError::Config("missing required argument: connection target".into())
        })?;

        let mut config = ReadyConfig::new(target);
        if let Some(s) = file.timeout.as_deref() {
            config.timeout = duration_field("timeout", s)?;
        }
        if let Some(s) = file.interval.as_deref() {
            config.interval = duration_field("interval", s)?;
        }
        if let Some(s) = file.attempt_timeout.as_deref() {
            config.attempt_timeout = Some(duration_field("attempt_timeout", s)?);
        }
        config.ca_cert = file.ca_cert.map(PathBuf::from);

        config.validate()?;
        Ok(config)
    }
}

fn duration_field(name: &str, value: &str) -> ReadyResult<Duration> {
    parse_duration(value)
        .ok_or_else(|| ReadyError::Config(format!("{name}: invalid duration {value:?}")))
}

/// Parse a duration string like "500ms", "5s", "2m", "1h" or "1m30s".
///
/// A bare number is read as seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(secs) = s.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit())?;
        if digits == 0 {
            return None;
        }
        let value: u64 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let part = match &rest[..unit_len] {
            "ms" => Duration::from_millis(value),
            "s" => Duration::from_secs(value),
            "m" => Duration::from_secs(value.checked_mul(60)?),
            "h" => Duration::from_secs(value.checked_mul(3600)?),
            _ => return None,
        };
        total = total.checked_add(part)?;
        rest = &rest[unit_len..];
    }
    Some(total)
}
