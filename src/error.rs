//! Error types for iptables-diff.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for iptables-diff operations.
///
/// Parsing and comparison never fail on content; only reading inputs,
/// invoking the tool incorrectly, or a broken config file can.
#[derive(Debug, Error)]
pub enum DiffError {
    /// An input snapshot could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Required inputs were not supplied.
    #[error("Usage error: {0}")]
    Usage(String),

    /// The configuration file is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The report could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl DiffError {
    /// Create an I/O error tied to the file that failed.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<toml::de::Error> for DiffError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for iptables-diff operations.
pub type DiffResult<T> = Result<T, DiffError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_path() {
        let err = DiffError::io(
            "rules-before.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
        );
        assert_eq!(
            err.to_string(),
            "cannot read rules-before.txt: No such file or directory"
        );
    }

    #[test]
    fn test_usage_display() {
        let err = DiffError::Usage("missing --after".into());
        assert_eq!(err.to_string(), "Usage error: missing --after");
    }
}
