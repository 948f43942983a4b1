//! On-disk cache of UniProt entry XML
//!
//! Layout: `{cache_dir}/{last two characters of accession}/{accession}.xml`,
//! e.g. `entries/45/P12345.xml`. Files are written once and never refreshed
//! here; deleting a file forces a re-download on the next load.

use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

use super::client::UniProtClient;
use super::config::UniProtConfig;
use super::models::AnnotationRecord;
use super::parser::AnnotationParser;
use super::{FetchError, Result};

/// Cache-through loader for entry XML
#[derive(Debug, Clone)]
pub struct EntryCache {
    client: UniProtClient,
    parser: AnnotationParser,
}

impl EntryCache {
    pub fn new(config: UniProtConfig) -> Result<Self> {
        Ok(Self {
            client: UniProtClient::new(config)?,
            parser: AnnotationParser::default(),
        })
    }

    /// Use a non-default parser configuration for `load_record`
    pub fn with_parser(mut self, parser: AnnotationParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn cache_dir(&self) -> Option<&Path> {
        self.client.config().cache_dir.as_deref()
    }

    /// Cache file for an accession, `None` when caching is disabled
    pub fn entry_path(&self, accession: &str) -> Option<PathBuf> {
        self.cache_dir()
            .map(|dir| dir.join(shard(accession)).join(format!("{}.xml", accession)))
    }

    /// Entry XML, from disk when cached, otherwise fetched and stored
    pub async fn load(&self, accession: &str) -> Result<String> {
        validate_accession(accession)?;

        let Some(path) = self.entry_path(accession) else {
            return Ok(self.client.fetch_entry(accession).await?);
        };

        if tokio::fs::try_exists(&path).await? {
            let xml = tokio::fs::read_to_string(&path).await?;
            debug!(accession = %accession, path = %path.display(), "Loaded entry from cache");
            return Ok(xml);
        }

        let xml = self.client.fetch_entry(accession).await?;
        store(&path, &xml).await?;
        info!(accession = %accession, path = %path.display(), "Cached entry");

        Ok(xml)
    }

    /// Load and parse one entry
    pub async fn load_record(&self, accession: &str) -> Result<AnnotationRecord> {
        let xml = self.load(accession).await?;
        Ok(self.parser.parse_entry(&xml)?)
    }

    /// Load and parse a batch, at most `concurrency` downloads in flight
    ///
    /// Results come back in input order; one failure does not abort the batch.
    pub async fn load_many<S: AsRef<str>>(
        &self,
        accessions: &[S],
    ) -> Vec<(String, Result<AnnotationRecord>)> {
        let concurrency = self.client.config().concurrency;

        stream::iter(accessions.iter().map(|a| a.as_ref().to_string()))
            .map(|accession| async move {
                let result = self.load_record(&accession).await;
                if let Err(ref e) = result {
                    warn!(accession = %accession, error = %e, "Failed to load entry");
                }
                (accession, result)
            })
            .buffered(concurrency)
            .collect()
            .await
    }

    pub fn client(&self) -> &UniProtClient {
        &self.client
    }
}

/// Shard directory name: the last two characters of the accession
fn shard(accession: &str) -> String {
    let chars: Vec<char> = accession.chars().collect();
    let start = chars.len().saturating_sub(2);
    chars[start..].iter().collect()
}

/// Accessions become file names, so only a conservative alphabet is allowed
fn validate_accession(accession: &str) -> std::result::Result<(), FetchError> {
    let valid = !accession.is_empty()
        && accession
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(FetchError::InvalidUrl(format!("invalid accession '{}'", accession)))
    }
}

/// Write through a temporary file so readers never see a partial entry
async fn store(path: &Path, xml: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = temp_path(path);
    tokio::fs::write(&tmp, xml).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }
    Ok(())
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Sibling temp name unique per process and per write
fn temp_path(path: &Path) -> PathBuf {
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_extension(format!("xml.{}.{}.part", std::process::id(), n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shard_uses_last_two_characters() {
        assert_eq!(shard("P12345"), "45");
        assert_eq!(shard("Q9Y6K9"), "K9");
        assert_eq!(shard("X"), "X");
    }

    #[test]
    fn test_entry_path_layout() {
        let config = UniProtConfig::builder().cache_dir("/data/entries").build().unwrap();
        let cache = EntryCache::new(config).unwrap();
        assert_eq!(
            cache.entry_path("P12345"),
            Some(PathBuf::from("/data/entries/45/P12345.xml"))
        );
    }

    #[test]
    fn test_entry_path_without_cache_dir() {
        let cache = EntryCache::new(UniProtConfig::default()).unwrap();
        assert_eq!(cache.entry_path("P12345"), None);
    }

    #[test]
    fn test_temp_paths_are_unique_siblings() {
        let path = PathBuf::from("/data/entries/45/P12345.xml");
        let first = temp_path(&path);
        let second = temp_path(&path);

        assert_ne!(first, second);
        assert_eq!(first.parent(), path.parent());
        assert!(first.to_string_lossy().ends_with(".part"));
    }

    #[tokio::test]
    async fn test_concurrent_stores_of_same_entry_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("45").join("P12345.xml");

        let (a, b) = tokio::join!(store(&path, "<entry/>"), store(&path, "<entry/>"));
        a.unwrap();
        b.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<entry/>");
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_validate_accession() {
        assert!(validate_accession("P12345").is_ok());
        assert!(validate_accession("P12345-2").is_ok());
        assert!(validate_accession("").is_err());
        assert!(validate_accession("../etc/passwd").is_err());
        assert!(validate_accession("P1 2345").is_err());
    }
}
