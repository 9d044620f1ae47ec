//! Filing document location and download.
//!
//! For one filing, decides what artifact to hand the UI: a native PDF from
//! the filing's directory listing when one exists, otherwise the primary
//! document converted by an external collaborator. Downloaded artifacts are
//! cached on disk with no expiry — filings are immutable once published.

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use quotedesk_core::{MarketError, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::client::RateLimitedHttpClient;
use crate::resolver::parse_cik;

/// SEC archives base URL.
pub const EDGAR_ARCHIVES_BASE_URL: &str = "https://www.sec.gov";

/// External collaborator that renders an HTML document to PDF.
///
/// Conversion happens out of process (the desktop shell prints the page);
/// this trait is the seam the locator talks through.
#[async_trait]
pub trait DocumentConverter: Send + Sync + Debug {
    /// Renders the document at `url` into a PDF at `dest`.
    async fn convert_to_pdf(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Directory listing of one filing.
#[derive(Debug, Default, Deserialize)]
struct IndexResponse {
    #[serde(default)]
    directory: Option<IndexDirectory>,
}

#[derive(Debug, Default, Deserialize)]
struct IndexDirectory {
    #[serde(default)]
    item: Vec<IndexItem>,
}

#[derive(Debug, Deserialize)]
struct IndexItem {
    #[serde(default)]
    name: String,
}

/// Locates and downloads the best artifact for a filing.
#[derive(Debug)]
pub struct FilingDocumentLocator {
    client: Arc<RateLimitedHttpClient>,
    converter: Arc<dyn DocumentConverter>,
    cache_dir: PathBuf,
    base_url: String,
}

impl FilingDocumentLocator {
    /// Creates a locator caching artifacts under `data_dir`.
    #[must_use]
    pub fn new(
        client: Arc<RateLimitedHttpClient>,
        converter: Arc<dyn DocumentConverter>,
        data_dir: &Path,
    ) -> Self {
        Self::with_base_url(client, converter, data_dir, EDGAR_ARCHIVES_BASE_URL)
    }

    /// Creates a locator against a custom archives endpoint.
    #[must_use]
    pub fn with_base_url(
        client: Arc<RateLimitedHttpClient>,
        converter: Arc<dyn DocumentConverter>,
        data_dir: &Path,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            converter,
            cache_dir: data_dir.join("edgar-documents"),
            base_url: base_url.into(),
        }
    }

    /// Downloads the filing's best artifact, returning its local path.
    ///
    /// A cached artifact is returned as-is without touching the network.
    /// Otherwise the directory listing is consulted: a `.pdf` entry is
    /// downloaded directly; failing that, the primary document is handed
    /// to the converter.
    pub async fn download_document(
        &self,
        cik: &str,
        accession_number: &str,
        primary_document: Option<&str>,
    ) -> Result<PathBuf> {
        let cik_numeric = parse_cik(cik)?;
        let dest = self.artifact_path(cik_numeric, accession_number);

        if tokio::fs::try_exists(&dest).await.unwrap_or(false) {
            debug!(path = %dest.display(), "filing artifact already cached");
            return Ok(dest);
        }

        let accession_flat: String = accession_number
            .chars()
            .filter(|c| *c != '-')
            .collect();
        let base_path = format!(
            "{}/Archives/edgar/data/{}/{}",
            self.base_url, cik_numeric, accession_flat
        );

        // Older filings may lack a directory listing; fall back to the
        // known primary document in that case.
        let listing: Option<IndexResponse> = match self
            .client
            .fetch_json(&format!("{base_path}/index.json"))
            .await
        {
            Ok(listing) => Some(listing),
            Err(e) => {
                debug!(error = %e, "no directory listing for filing");
                None
            }
        };

        let items = listing
            .and_then(|l| l.directory)
            .map(|d| d.item)
            .unwrap_or_default();

        let pdf_name = items
            .iter()
            .map(|item| item.name.as_str())
            .find(|name| name.to_lowercase().ends_with(".pdf"));

        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| MarketError::Store(e.to_string()))?;

        if let Some(pdf_name) = pdf_name {
            let url = format!("{base_path}/{pdf_name}");
            debug!(%url, "downloading native filing PDF");
            let bytes = self.client.fetch_bytes(&url).await?;
            tokio::fs::write(&dest, bytes)
                .await
                .map_err(|e| MarketError::Store(e.to_string()))?;
            return Ok(dest);
        }

        let primary = primary_document
            .map(str::to_string)
            .or_else(|| items.first().map(|item| item.name.clone()))
            .ok_or_else(|| {
                MarketError::NotFound(format!(
                    "no downloadable document for filing {accession_number}"
                ))
            })?;

        let url = format!("{base_path}/{primary}");
        debug!(%url, "converting primary document to PDF");
        self.converter.convert_to_pdf(&url, &dest).await?;

        if !tokio::fs::try_exists(&dest).await.unwrap_or(false) {
            warn!(path = %dest.display(), "converter reported success but produced no file");
            return Err(MarketError::Store(format!(
                "converted artifact missing at {}",
                dest.display()
            )));
        }
        Ok(dest)
    }

    fn artifact_path(&self, cik_numeric: u64, accession_number: &str) -> PathBuf {
        let safe_accession: String = accession_number
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect();
        self.cache_dir
            .join(format!("{cik_numeric}-{safe_accession}.pdf"))
    }
}
