//! Durable per-company filing history.
//!
//! Filing lists change infrequently, and the submissions endpoint is rate
//! limited, so the store keeps one on-disk record per CIK and serves it
//! as-is regardless of age. The explicit refresh flag is the only staleness
//! control — a deliberate tradeoff of staleness risk for request-count
//! reduction.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use quotedesk_core::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::RateLimitedHttpClient;
use crate::resolver::{pad_cik, parse_cik};

/// SEC EDGAR data API base URL.
pub const EDGAR_DATA_BASE_URL: &str = "https://data.sec.gov";

/// Maximum filings returned from one listing call, applied after filtering.
const MAX_LISTED_FILINGS: usize = 100;

/// One regulatory filing. Immutable once listed; identity is
/// `(cik, accession_number)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filing {
    /// CIK zero-padded to 10 digits.
    pub cik: String,
    /// CIK without leading zeros.
    pub cik_numeric: String,
    /// Accession number identifying the submission.
    pub accession_number: String,
    /// Form type, uppercased (e.g. "10-K").
    pub form: String,
    /// Date the filing was submitted.
    pub filing_date: Option<NaiveDate>,
    /// Period the filing reports on.
    pub report_date: Option<NaiveDate>,
    /// Name of the primary document inside the submission.
    pub primary_document: Option<String>,
    /// Human-readable description of the primary document.
    pub description: Option<String>,
}

/// On-disk cache record: the full filing history of one CIK, all form
/// types, plus the time it was fetched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilingsCacheRecord {
    /// When the record was fetched from the regulator.
    pub last_fetched_at: DateTime<Utc>,
    /// Complete filing list, superset of all form types.
    pub filings: Vec<Filing>,
}

/// Column-oriented recent-filings block of the submissions response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentFilings {
    #[serde(default)]
    accession_number: Vec<String>,
    #[serde(default)]
    filing_date: Vec<String>,
    #[serde(default)]
    report_date: Vec<String>,
    #[serde(default)]
    form: Vec<String>,
    #[serde(default)]
    primary_document: Vec<String>,
    #[serde(default)]
    primary_doc_description: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SubmissionFilings {
    #[serde(default)]
    recent: Option<RecentFilings>,
}

#[derive(Debug, Deserialize)]
struct SubmissionsResponse {
    #[serde(default)]
    filings: Option<SubmissionFilings>,
}

/// Per-company filing cache with explicit refresh.
#[derive(Debug)]
pub struct FilingsStore {
    client: Arc<RateLimitedHttpClient>,
    dir: PathBuf,
    base_url: String,
}

impl FilingsStore {
    /// Creates a store persisting records under `data_dir`.
    #[must_use]
    pub fn new(client: Arc<RateLimitedHttpClient>, data_dir: &Path) -> Self {
        Self::with_base_url(client, data_dir, EDGAR_DATA_BASE_URL)
    }

    /// Creates a store against a custom submissions endpoint.
    #[must_use]
    pub fn with_base_url(
        client: Arc<RateLimitedHttpClient>,
        data_dir: &Path,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            dir: data_dir.join("edgar-filings"),
            base_url: base_url.into(),
        }
    }

    /// Lists filings for a CIK, filtered by form type.
    ///
    /// A persisted record is used as-is unless `force_refresh` is set or no
    /// readable record exists, in which case the complete unfiltered
    /// history is fetched and the record overwritten. Filtering happens
    /// afterwards, in memory, case-insensitively; an empty `forms` slice
    /// means all forms.
    pub async fn list_filings(
        &self,
        cik: &str,
        forms: &[String],
        force_refresh: bool,
    ) -> Result<FilingsCacheRecord> {
        let cik_numeric = parse_cik(cik)?;

        let record = if force_refresh {
            self.refresh(cik_numeric).await?
        } else {
            match self.read_record(cik_numeric).await {
                Some(record) => record,
                None => self.refresh(cik_numeric).await?,
            }
        };

        let filter: Vec<String> = forms.iter().map(|f| f.trim().to_uppercase()).collect();
        let filings: Vec<Filing> = record
            .filings
            .into_iter()
            .filter(|f| filter.is_empty() || filter.contains(&f.form))
            .take(MAX_LISTED_FILINGS)
            .collect();

        Ok(FilingsCacheRecord {
            last_fetched_at: record.last_fetched_at,
            filings,
        })
    }

    /// Fetches the complete filing history and overwrites the record.
    async fn refresh(&self, cik_numeric: u64) -> Result<FilingsCacheRecord> {
        let padded = pad_cik(cik_numeric);
        let url = format!("{}/submissions/CIK{}.json", self.base_url, padded);
        debug!(%url, "fetching company submissions");

        let response: SubmissionsResponse = self.client.fetch_json(&url).await?;
        let recent = response
            .filings
            .and_then(|f| f.recent)
            .unwrap_or_default();

        let filings = collect_filings(cik_numeric, &recent);
        let record = FilingsCacheRecord {
            last_fetched_at: Utc::now(),
            filings,
        };

        self.write_record(cik_numeric, &record).await;
        Ok(record)
    }

    fn record_path(&self, cik_numeric: u64) -> PathBuf {
        self.dir.join(format!("{cik_numeric}.json"))
    }

    /// Reads the persisted record; corrupt or unreadable state is treated
    /// as absent, never surfaced as an error.
    async fn read_record(&self, cik_numeric: u64) -> Option<FilingsCacheRecord> {
        let path = self.record_path(cik_numeric);
        let raw = tokio::fs::read(&path).await.ok()?;
        match serde_json::from_slice(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt filings record, refetching");
                None
            }
        }
    }

    async fn write_record(&self, cik_numeric: u64, record: &FilingsCacheRecord) {
        let path = self.record_path(cik_numeric);
        let write = async {
            tokio::fs::create_dir_all(&self.dir).await?;
            let raw = serde_json::to_vec(record)?;
            tokio::fs::write(&path, raw).await?;
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(())
        };
        if let Err(e) = write.await {
            warn!(path = %path.display(), error = %e, "failed to persist filings record");
        }
    }
}

/// Zips the column-oriented submissions arrays into [`Filing`] rows.
fn collect_filings(cik_numeric: u64, recent: &RecentFilings) -> Vec<Filing> {
    let cik = pad_cik(cik_numeric);
    let cik_numeric = cik_numeric.to_string();
    fn get<'a>(v: &'a [String], i: usize) -> &'a str {
        v.get(i).map(|s| s.as_str()).unwrap_or("")
    }

    (0..recent.accession_number.len())
        .map(|i| Filing {
            cik: cik.clone(),
            cik_numeric: cik_numeric.clone(),
            accession_number: recent.accession_number[i].clone(),
            form: get(&recent.form, i).to_uppercase(),
            filing_date: parse_date(get(&recent.filing_date, i)),
            report_date: parse_date(get(&recent.report_date, i)),
            primary_document: non_empty(get(&recent.primary_document, i)),
            description: non_empty(get(&recent.primary_doc_description, i)),
        })
        .collect()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
