//! PDB / AlphaFold structure references and raw file retrieval
//!
//! Only locating and downloading structure files lives here; the coordinate
//! formats themselves are not parsed.

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::io::Read;
use suppaftp::{FtpStream, Mode};
use tracing::{debug, info};

use crate::uniprot::models::{CrossReference, ALPHAFOLD_TERM_TYPE, PDB_TERM_TYPE};
use crate::uniprot::{AnnotationRecord, FetchError, UniProtClient, UniProtConfig};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const DEFAULT_FTP_PORT: u16 = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureSource {
    Pdb,
    AlphaFold,
}

impl StructureSource {
    /// Source for a cross-reference bucket name, case-insensitive
    pub fn from_term_type(term_type: &str) -> Option<Self> {
        match term_type.to_lowercase().as_str() {
            PDB_TERM_TYPE => Some(StructureSource::Pdb),
            ALPHAFOLD_TERM_TYPE => Some(StructureSource::AlphaFold),
            _ => None,
        }
    }
}

/// A structure a record points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureRef {
    pub source: StructureSource,
    pub id: String,
}

impl StructureRef {
    pub fn from_reference(reference: &CrossReference) -> Option<Self> {
        StructureSource::from_term_type(&reference.db_type).map(|source| Self {
            source,
            id: reference.id.clone(),
        })
    }

    /// Every PDB and AlphaFold reference of a record, PDB first
    pub fn from_record(record: &AnnotationRecord) -> Vec<Self> {
        record
            .structure_references()
            .filter_map(Self::from_reference)
            .collect()
    }

    /// Download location of the structure file
    ///
    /// PDB entries resolve to `{pdb_base}/pdb{id}.ent.gz` with a lower-cased
    /// id, AlphaFold entries to `{alphafold_base}/AF-{id}-F1-model_{version}.pdb`.
    pub fn download_url(&self, config: &UniProtConfig) -> String {
        match self.source {
            StructureSource::Pdb => format!(
                "{}/pdb{}.ent.gz",
                config.pdb_base_url.trim_end_matches('/'),
                self.id.to_lowercase()
            ),
            StructureSource::AlphaFold => format!(
                "{}/AF-{}-F1-model_{}.pdb",
                config.alphafold_base_url.trim_end_matches('/'),
                self.id,
                config.alphafold_model_version
            ),
        }
    }

    /// Download this structure, decompressed
    pub async fn fetch(&self, client: &UniProtClient) -> Result<Vec<u8>, FetchError> {
        let url = self.download_url(client.config());
        info!(source = ?self.source, id = %self.id, url = %url, "Fetching structure");
        fetch_structure(client, &url).await
    }
}

/// Fetch a structure file over HTTP(S) or FTP
///
/// Gzip payloads are decompressed; anything else is returned as received.
pub async fn fetch_structure(client: &UniProtClient, url: &str) -> Result<Vec<u8>, FetchError> {
    let payload = if url.starts_with("ftp://") {
        download_ftp(url).await?
    } else if url.starts_with("http://") || url.starts_with("https://") {
        download_http(client, url).await?
    } else {
        return Err(FetchError::InvalidUrl(url.to_string()));
    };

    maybe_decompress(payload)
}

async fn download_http(client: &UniProtClient, url: &str) -> Result<Vec<u8>, FetchError> {
    let response = client.http().get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let bytes = response.bytes().await?;
    debug!(url = %url, bytes = bytes.len(), "Downloaded structure over HTTP");
    Ok(bytes.to_vec())
}

async fn download_ftp(url: &str) -> Result<Vec<u8>, FetchError> {
    let (address, path) = parse_ftp_url(url)?;

    info!("Connecting to FTP server: {}", address);

    tokio::task::spawn_blocking(move || {
        let mut ftp_stream =
            FtpStream::connect(&address).map_err(|e| FetchError::Ftp(e.to_string()))?;

        ftp_stream
            .login("anonymous", "anonymous@")
            .map_err(|e| FetchError::Ftp(e.to_string()))?;

        ftp_stream.set_mode(Mode::Passive);

        debug!("Downloading file: {}", path);

        let cursor = ftp_stream
            .retr_as_buffer(&path)
            .map_err(|e| FetchError::Ftp(e.to_string()))?;

        ftp_stream.quit().map_err(|e| FetchError::Ftp(e.to_string()))?;

        Ok::<Vec<u8>, FetchError>(cursor.into_inner())
    })
    .await
    .map_err(|e| FetchError::Ftp(e.to_string()))?
}

/// Split `ftp://host[:port]/path` into `host:port` and the remote path
fn parse_ftp_url(url: &str) -> Result<(String, String), FetchError> {
    let rest = url
        .strip_prefix("ftp://")
        .ok_or_else(|| FetchError::InvalidUrl(url.to_string()))?;

    let (host, path) = rest
        .split_once('/')
        .ok_or_else(|| FetchError::InvalidUrl(url.to_string()))?;

    if host.is_empty() || path.trim_start_matches('/').is_empty() {
        return Err(FetchError::InvalidUrl(url.to_string()));
    }

    let address = if host.contains(':') {
        host.to_string()
    } else {
        format!("{}:{}", host, DEFAULT_FTP_PORT)
    };

    Ok((address, format!("/{}", path.trim_start_matches('/'))))
}

/// Gunzip when the payload starts with the gzip magic bytes
pub fn maybe_decompress(payload: Vec<u8>) -> Result<Vec<u8>, FetchError> {
    if !payload.starts_with(&GZIP_MAGIC) {
        return Ok(payload);
    }

    let mut decoder = GzDecoder::new(payload.as_slice());
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| FetchError::Decompression(e.to_string()))?;

    Ok(decompressed)
}
