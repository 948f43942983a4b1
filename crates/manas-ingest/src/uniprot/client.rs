//! HTTP client for UniProt entry XML

use regex::Regex;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use super::config::UniProtConfig;
use super::models::AnnotationRecord;
use super::parser::AnnotationParser;
use super::{FetchError, Result};
use manas_common::ManasError;

/// Accepts `application/xml` and `text/xml`, optionally followed by parameters
const XML_CONTENT_TYPE_PATTERN: &str = r"^(application|text)/xml\s*(;|$)";

/// Fetches entry XML from the UniProt REST API
#[derive(Debug, Clone)]
pub struct UniProtClient {
    client: Client,
    config: UniProtConfig,
    xml_content_type: Regex,
}

impl UniProtClient {
    pub fn new(config: UniProtConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(FetchError::from)?;

        let xml_content_type = Regex::new(XML_CONTENT_TYPE_PATTERN)
            .map_err(|e| ManasError::config(e.to_string()))?;

        Ok(Self {
            client,
            config,
            xml_content_type,
        })
    }

    /// Fetch the XML text of one entry
    ///
    /// Fails with [`FetchError::Status`] on a non-2xx response and with
    /// [`FetchError::MissingContentType`] / [`FetchError::UnexpectedContentType`]
    /// when the body is not declared as XML.
    pub async fn fetch_entry(&self, accession: &str) -> std::result::Result<String, FetchError> {
        let url = self.config.entry_url(accession);
        info!(accession = %accession, url = %url, "Fetching UniProt entry");
        self.fetch_xml(&url).await
    }

    /// Fetch and parse one entry
    pub async fn fetch_record(&self, accession: &str) -> Result<AnnotationRecord> {
        let xml = self.fetch_entry(accession).await?;
        Ok(AnnotationParser::default().parse_entry(&xml)?)
    }

    /// GET a URL that must answer with XML
    pub async fn fetch_xml(&self, url: &str) -> std::result::Result<String, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .ok_or_else(|| FetchError::MissingContentType {
                url: url.to_string(),
            })?;

        if !self.is_xml_content_type(&content_type) {
            return Err(FetchError::UnexpectedContentType { content_type });
        }

        let text = response.text().await?;
        debug!(url = %url, bytes = text.len(), "Fetched XML");
        Ok(text)
    }

    pub fn is_xml_content_type(&self, content_type: &str) -> bool {
        self.xml_content_type.is_match(content_type)
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    pub fn config(&self) -> &UniProtConfig {
        &self.config
    }
}
