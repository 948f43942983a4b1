//! UniProt entry handling
//!
//! - [`parser`]: streaming XML parser producing [`AnnotationRecord`]s
//! - [`client`]: HTTP retrieval of entry XML from the UniProt REST API
//! - [`cache`]: sharded on-disk cache in front of the client
//! - [`config`]: explicit endpoint / cache / timeout settings
//!
//! # Example
//! ```no_run
//! use manas_ingest::uniprot::{EntryCache, UniProtConfig};
//!
//! # async fn example() -> manas_ingest::uniprot::Result<()> {
//! let config = UniProtConfig::builder().cache_dir("/data/uniprot/entries").build()?;
//! let cache = EntryCache::new(config)?;
//!
//! let record = cache.load_record("P12345").await?;
//! for go in record.go_terms() {
//!     println!("{} {:?}", go.id, go.property("evidence"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod models;
pub mod parser;

// Re-export commonly used types
pub use cache::EntryCache;
pub use client::UniProtClient;
pub use config::UniProtConfig;
pub use models::{AnnotationRecord, CrossReference};
pub use parser::{
    parse_entries, parse_entry, AnnotationParser, EntryMode, ParsedDocument, ParserConfig,
    TermFilter,
};

use manas_common::ManasError;

/// Result type for UniProt operations
pub type Result<T> = std::result::Result<T, UniProtError>;

/// Malformed XML token stream. The parse is abandoned; nothing partial is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("XML parse error at byte {position}: {message}")]
pub struct ParseError {
    /// Byte offset reported by the tokenizer
    pub position: u64,
    pub message: String,
}

impl ParseError {
    pub fn new(position: u64, message: impl std::fmt::Display) -> Self {
        Self {
            position,
            message: message.to_string(),
        }
    }
}

/// Retrieval failures. Never retried here; retry policy belongs to the caller.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status code fetching {url}: {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("content-type header not sent by {url}")]
    MissingContentType { url: String },

    #[error(
        "unexpected content-type: expected application/xml or text/xml, received: {content_type}"
    )]
    UnexpectedContentType { content_type: String },

    #[error("FTP transfer failed: {0}")]
    Ftp(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Decompression error: {0}")]
    Decompression(String),
}

/// Error type for UniProt operations
#[derive(Debug, thiserror::Error)]
pub enum UniProtError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ManasError),
}

impl From<UniProtError> for ManasError {
    fn from(err: UniProtError) -> Self {
        match err {
            UniProtError::Parse(e) => ManasError::parse(e.to_string()),
            UniProtError::Fetch(e) => ManasError::network(e.to_string()),
            UniProtError::Io(e) => ManasError::Io(e),
            UniProtError::Config(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_becomes_network_error() {
        let err = UniProtError::Fetch(FetchError::InvalidUrl("gopher://x".to_string()));
        let manas: ManasError = err.into();
        assert!(matches!(manas, ManasError::Network(ref msg) if msg.contains("gopher://x")));
    }

    #[test]
    fn test_parse_error_becomes_parse_error() {
        let err = UniProtError::Parse(ParseError::new(7, "unmatched end tag"));
        let manas: ManasError = err.into();
        assert!(matches!(manas, ManasError::Parse(ref msg) if msg.contains("unmatched end tag")));
    }
}
