//! Error types for Manas

use thiserror::Error;

/// Result type alias for Manas operations
pub type Result<T> = std::result::Result<T, ManasError>;

/// Workspace-level error type
///
/// Domain modules keep their own narrower errors (`ParseError`,
/// `FetchError`, `OntologyError`) and convert into this one at crate
/// boundaries.
#[derive(Error, Debug)]
pub enum ManasError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl ManasError {
    pub fn config(msg: impl Into<String>) -> Self {
        ManasError::Config(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        ManasError::Network(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        ManasError::Parse(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ManasError::config("timeout must be greater than 0").to_string(),
            "Configuration error: timeout must be greater than 0"
        );
        assert_eq!(ManasError::parse("bad stanza").to_string(), "Parse error: bad stanza");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ManasError = io.into();
        assert!(matches!(err, ManasError::Io(_)));
    }
}
