//! Config error types for tailf.
//!
//! Provides rich error messages with file locations and typo suggestions.

use std::fmt;
use std::path::PathBuf;

use strsim::jaro_winkler;

use crate::config::types::KNOWN_FIELDS;

const SIMILARITY_THRESHOLD: f64 = 0.8;

/// Error loading or parsing a config file.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading the config file.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML parse error.
    Parse {
        path: PathBuf,
        message: String,
        suggestion: Option<String>,
    },

    /// Validation error (semantic errors after parsing).
    Validation { path: PathBuf, message: String },
}

impl ConfigError {
    /// Build a parse error, suggesting a known field for unknown-field errors.
    pub fn parse(path: PathBuf, message: String) -> Self {
        let suggestion = unknown_field(&message).and_then(suggest_field);
        ConfigError::Parse {
            path,
            message,
            suggestion,
        }
    }

    /// Format error in Cargo-style format.
    pub fn format_cargo_style(&self) -> String {
        match self {
            ConfigError::Io { path, source } => {
                format!(
                    "error: cannot read config file\n  --> {}\n  |\n  = {}\n",
                    path.display(),
                    source
                )
            }
            ConfigError::Parse {
                path,
                message,
                suggestion,
            } => {
                let mut output = format!("error: {}\n  --> {}\n  |\n", message, path.display());
                if let Some(suggestion) = suggestion {
                    output.push_str(&format!("  = help: did you mean `{}`?\n", suggestion));
                }
                output
            }
            ConfigError::Validation { path, message } => {
                format!("error: {}\n  --> {}\n  |\n", message, path.display())
            }
        }
    }
}

/// Extract the offending key from a serde "unknown field `x`" message.
fn unknown_field(message: &str) -> Option<&str> {
    let rest = message.split("unknown field `").nth(1)?;
    rest.split('`').next()
}

/// Closest known field name, if any is similar enough.
fn suggest_field(name: &str) -> Option<String> {
    KNOWN_FIELDS
        .iter()
        .filter(|&&known| jaro_winkler(name, known) >= SIMILARITY_THRESHOLD)
        .max_by(|a, b| {
            jaro_winkler(name, a)
                .partial_cmp(&jaro_winkler(name, b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|s| s.to_string())
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_cargo_style())
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_field_extraction() {
        let message = "unknown field `line`, expected one of `lines`, `sleep_interval`";
        assert_eq!(unknown_field(message), Some("line"));
        assert_eq!(unknown_field("invalid type: string"), None);
    }

    #[test]
    fn test_parse_error_suggests_close_field() {
        let err = ConfigError::parse(
            PathBuf::from("config.yaml"),
            "unknown field `sleep_intervall`".to_string(),
        );
        let text = err.to_string();
        assert!(text.contains("config.yaml"));
        assert!(text.contains("did you mean `sleep_interval`?"));
    }

    #[test]
    fn test_parse_error_without_suggestion() {
        let err = ConfigError::parse(
            PathBuf::from("config.yaml"),
            "unknown field `zzz`".to_string(),
        );
        assert!(!err.to_string().contains("did you mean"));
    }

    #[test]
    fn test_validation_format() {
        let err = ConfigError::Validation {
            path: PathBuf::from("/etc/tailf.yaml"),
            message: "`lines` must be at least 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "error: `lines` must be at least 1\n  --> /etc/tailf.yaml\n  |\n"
        );
    }
}
