//! UniProt retrieval configuration
//!
//! Passed explicitly to [`UniProtClient`](super::UniProtClient),
//! [`EntryCache`](super::EntryCache) and the structure fetcher. Nothing in
//! the parser or the ontology resolver reads it.

use manas_common::{ManasError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default UniProtKB REST endpoint; entries live at `{base}/{accession}.xml`.
pub const DEFAULT_ENTRY_BASE_URL: &str = "https://rest.uniprot.org/uniprotkb";

/// Default wwPDB archive holding `pdb{id}.ent.gz` files.
pub const DEFAULT_PDB_BASE_URL: &str = "ftp://ftp.wwpdb.org/pub/pdb/data/structures/all/pdb";

/// Default AlphaFold DB file endpoint.
pub const DEFAULT_ALPHAFOLD_BASE_URL: &str = "https://alphafold.ebi.ac.uk/files";

/// AlphaFold model version used when building model URLs.
pub const DEFAULT_ALPHAFOLD_MODEL_VERSION: &str = "v4";

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of concurrent downloads for batch loads.
pub const DEFAULT_CONCURRENCY: usize = 8;

const DEFAULT_USER_AGENT: &str = concat!("manas-ingest/", env!("CARGO_PKG_VERSION"));

/// Configuration for UniProt and structure retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniProtConfig {
    /// Base URL for entry XML
    pub entry_base_url: String,

    /// Directory of the sharded entry cache (None disables caching)
    pub cache_dir: Option<PathBuf>,

    /// HTTP timeout in seconds
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// Maximum in-flight downloads for batch loads
    pub concurrency: usize,

    pub pdb_base_url: String,
    pub alphafold_base_url: String,
    pub alphafold_model_version: String,
}

impl Default for UniProtConfig {
    fn default() -> Self {
        Self {
            entry_base_url: DEFAULT_ENTRY_BASE_URL.to_string(),
            cache_dir: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            pdb_base_url: DEFAULT_PDB_BASE_URL.to_string(),
            alphafold_base_url: DEFAULT_ALPHAFOLD_BASE_URL.to_string(),
            alphafold_model_version: DEFAULT_ALPHAFOLD_MODEL_VERSION.to_string(),
        }
    }
}

impl UniProtConfig {
    pub fn builder() -> UniProtConfigBuilder {
        UniProtConfigBuilder::default()
    }

    /// Load from environment variables on top of the defaults
    ///
    /// - `MANAS_UNIPROT_URL`: entry base URL
    /// - `MANAS_CACHE_DIR`: entry cache directory
    /// - `MANAS_HTTP_TIMEOUT_SECS`: HTTP timeout
    /// - `MANAS_CONCURRENCY`: batch download concurrency
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("MANAS_UNIPROT_URL") {
            config.entry_base_url = url;
        }

        if let Ok(dir) = std::env::var("MANAS_CACHE_DIR") {
            config.cache_dir = Some(PathBuf::from(dir));
        }

        if let Ok(secs) = std::env::var("MANAS_HTTP_TIMEOUT_SECS") {
            config.timeout_secs = secs.parse().map_err(|_| {
                ManasError::config(format!("Invalid MANAS_HTTP_TIMEOUT_SECS: {}", secs))
            })?;
        }

        if let Ok(n) = std::env::var("MANAS_CONCURRENCY") {
            config.concurrency = n
                .parse()
                .map_err(|_| ManasError::config(format!("Invalid MANAS_CONCURRENCY: {}", n)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// URL of one entry's XML document
    pub fn entry_url(&self, accession: &str) -> String {
        format!("{}/{}.xml", self.entry_base_url.trim_end_matches('/'), accession)
    }

    pub fn validate(&self) -> Result<()> {
        if self.entry_base_url.is_empty() {
            return Err(ManasError::config("Entry base URL cannot be empty"));
        }

        if self.timeout_secs == 0 {
            return Err(ManasError::config("Timeout must be greater than 0"));
        }

        if self.concurrency == 0 {
            return Err(ManasError::config("Concurrency must be greater than 0"));
        }

        if self.pdb_base_url.is_empty() || self.alphafold_base_url.is_empty() {
            return Err(ManasError::config("Structure base URLs cannot be empty"));
        }

        Ok(())
    }
}

/// Builder for UniProtConfig
#[derive(Debug, Default)]
pub struct UniProtConfigBuilder {
    entry_base_url: Option<String>,
    cache_dir: Option<PathBuf>,
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
    concurrency: Option<usize>,
    pdb_base_url: Option<String>,
    alphafold_base_url: Option<String>,
}

impl UniProtConfigBuilder {
    pub fn entry_base_url(mut self, url: impl Into<String>) -> Self {
        self.entry_base_url = Some(url.into());
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.concurrency = Some(n);
        self
    }

    pub fn pdb_base_url(mut self, url: impl Into<String>) -> Self {
        self.pdb_base_url = Some(url.into());
        self
    }

    pub fn alphafold_base_url(mut self, url: impl Into<String>) -> Self {
        self.alphafold_base_url = Some(url.into());
        self
    }

    /// Build and validate
    pub fn build(self) -> Result<UniProtConfig> {
        let default = UniProtConfig::default();

        let config = UniProtConfig {
            entry_base_url: self.entry_base_url.unwrap_or(default.entry_base_url),
            cache_dir: self.cache_dir,
            timeout_secs: self.timeout_secs.unwrap_or(default.timeout_secs),
            user_agent: self.user_agent.unwrap_or(default.user_agent),
            concurrency: self.concurrency.unwrap_or(default.concurrency),
            pdb_base_url: self.pdb_base_url.unwrap_or(default.pdb_base_url),
            alphafold_base_url: self.alphafold_base_url.unwrap_or(default.alphafold_base_url),
            alphafold_model_version: default.alphafold_model_version,
        };

        config.validate()?;
        Ok(config)
    }
}
