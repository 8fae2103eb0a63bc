//! Config loading for tailf.
//!
//! Loads and validates the YAML config file and resolves it into a
//! [`TailConfig`] on top of the built-in defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::config::error::ConfigError;
use crate::config::types::{FlushPolicy, RawConfig, TailConfig};

/// Load and parse a YAML config file.
fn load_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    // An empty file means "all defaults"
    if content.trim().is_empty() {
        return Ok(RawConfig::default());
    }

    serde_saphyr::from_str(&content)
        .map_err(|e| ConfigError::parse(path.to_path_buf(), e.to_string()))
}

/// Apply raw file values on top of `base`, validating each one.
pub fn resolve(raw: RawConfig, base: TailConfig, path: &Path) -> Result<TailConfig, ConfigError> {
    let invalid = |message: &str| ConfigError::Validation {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    let mut config = base;

    if let Some(lines) = raw.lines {
        if lines == 0 {
            return Err(invalid("`lines` must be at least 1"));
        }
        config.lines = lines;
    }

    if let Some(seconds) = raw.sleep_interval {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(invalid("`sleep_interval` must be a positive number of seconds"));
        }
        config.poll_interval = Duration::try_from_secs_f64(seconds)
            .map_err(|_| invalid("`sleep_interval` is too large"))?;
    }

    if let Some(ms) = raw.quiescence_ms {
        if ms == 0 {
            return Err(invalid("`quiescence_ms` must be greater than zero"));
        }
        config.quiescence = Duration::from_millis(ms);
    }

    if let Some(every_tick) = raw.flush_every_tick {
        config.flush_policy = if every_tick {
            FlushPolicy::EveryTick
        } else {
            FlushPolicy::OnQuiescence
        };
    }

    Ok(config)
}

/// Load the config file at `path` (if any) over the built-in defaults.
///
/// Returns the defaults when no config file was discovered.
pub fn load(path: Option<&Path>) -> Result<TailConfig, ConfigError> {
    match path {
        Some(path) => resolve(load_file(path)?, TailConfig::default(), path),
        None => Ok(TailConfig::default()),
    }
}
