//! Config types for tailf.
//!
//! [`TailConfig`] is the explicit configuration handed to the tailer and the
//! follow loops. [`RawConfig`] mirrors the optional YAML config file.

use serde::Deserialize;
use std::time::Duration;

/// Default number of lines in the tail window.
pub const DEFAULT_LINES: usize = 10;

/// Default quiescence interval: a stream idle this long gets flushed.
pub const DEFAULT_QUIESCENCE: Duration = Duration::from_secs(1);

/// Default sleep between follow cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// When a quiescence timer firing flushes the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushPolicy {
    /// Flush only when no line arrived during a whole interval.
    #[default]
    OnQuiescence,
    /// Flush on every firing, even while lines keep arriving.
    EveryTick,
}

/// Parameters of a tail run.
#[derive(Debug, Clone, PartialEq)]
pub struct TailConfig {
    /// Size of the tail window (N).
    pub lines: usize,
    /// Quiescence timer interval.
    pub quiescence: Duration,
    /// Sleep between follow passes and file re-opens.
    pub poll_interval: Duration,
    /// Keep emitting appended lines.
    pub follow: bool,
    /// Quiescence flush policy.
    pub flush_policy: FlushPolicy,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            lines: DEFAULT_LINES,
            quiescence: DEFAULT_QUIESCENCE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            follow: false,
            flush_policy: FlushPolicy::default(),
        }
    }
}

impl TailConfig {
    /// Reject values the tailer cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.lines >= 1, "line count must be at least 1");
        anyhow::ensure!(
            !self.quiescence.is_zero(),
            "quiescence interval must be greater than zero"
        );
        anyhow::ensure!(
            !self.poll_interval.is_zero(),
            "sleep interval must be greater than zero"
        );
        Ok(())
    }
}

/// Raw config file structure (used for parsing).
///
/// Unknown fields are rejected with an error.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// Default tail window size.
    pub lines: Option<usize>,
    /// Default follow poll interval in seconds.
    pub sleep_interval: Option<f64>,
    /// Quiescence interval in milliseconds.
    pub quiescence_ms: Option<u64>,
    /// Flush on every quiescence tick.
    pub flush_every_tick: Option<bool>,
}

/// Field names accepted in the config file, used for typo suggestions.
pub const KNOWN_FIELDS: &[&str] = &["lines", "sleep_interval", "quiescence_ms", "flush_every_tick"];
