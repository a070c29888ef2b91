use std::path::PathBuf;
use std::time::Duration;

use anyhow::{ensure, Context, Result};

use crate::extract::DEFAULT_ROW_LIMIT;

pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(8_000);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Bounds for waiting on the coin table to show up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_WAIT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConfig {
    pub wait: WaitConfig,
    pub row_limit: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            wait: WaitConfig::default(),
            row_limit: DEFAULT_ROW_LIMIT,
        }
    }
}

impl CaptureConfig {
    /// Durations and the row limit must all be non-zero.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.wait.timeout.is_zero(), "wait timeout must be greater than zero");
        ensure!(
            !self.wait.poll_interval.is_zero(),
            "poll interval must be greater than zero"
        );
        ensure!(self.row_limit > 0, "row limit must be a positive integer");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub capture: CaptureConfig,
    pub out_dir: PathBuf,
}

impl Config {
    /// Defaults overridden by `MARKET_SNAP_*` variables, `.env` included.
    pub fn from_env() -> Result<Self> {
        // dotenvy leaves variables that are already set alone
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let millis = |key: &str, default: Duration| -> Result<Duration> {
            let Some(raw) = lookup(key) else {
                return Ok(default);
            };
            let ms = raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{key} must be a whole number of milliseconds"))?;
            ensure!(ms > 0, "{key} must be greater than zero");
            Ok(Duration::from_millis(ms))
        };

        let row_limit = match lookup("MARKET_SNAP_ROW_LIMIT") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .context("MARKET_SNAP_ROW_LIMIT must be a positive integer")?,
            None => DEFAULT_ROW_LIMIT,
        };

        Ok(Self {
            capture: CaptureConfig {
                wait: WaitConfig {
                    timeout: millis("MARKET_SNAP_WAIT_TIMEOUT_MS", DEFAULT_WAIT_TIMEOUT)?,
                    poll_interval: millis("MARKET_SNAP_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL)?,
                },
                row_limit,
            },
            out_dir: lookup("MARKET_SNAP_OUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        })
    }
}
