//! Ticker/name to company (CIK) resolution.
//!
//! The SEC publishes one large directory of all registered companies. It
//! changes slowly and the endpoint is expensive, so the directory is
//! fetched once per process lifetime, persisted locally, and reused
//! indefinitely afterwards.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use quotedesk_core::{MarketError, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::client::RateLimitedHttpClient;

/// SEC company tickers directory URL.
pub const COMPANY_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";

/// File name of the locally persisted directory snapshot.
const SNAPSHOT_FILE: &str = "edgar-company-tickers.json";

/// Maximum number of candidates collected per query.
const MAX_MATCHES: usize = 25;

/// A resolved company identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// CIK zero-padded to 10 digits, as regulator URL paths require.
    pub cik: String,
    /// CIK without leading zeros.
    pub cik_numeric: String,
    /// Ticker symbol.
    pub ticker: String,
    /// Registered company name.
    pub name: String,
}

/// One entry of the SEC ticker directory.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct TickerEntry {
    cik_str: u64,
    ticker: String,
    title: String,
}

/// Parses a CIK in any accepted form to its numeric value.
///
/// Accepts zero-padded and bare decimal strings.
pub fn parse_cik(cik: &str) -> Result<u64> {
    let trimmed = cik.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(MarketError::InvalidInput(format!("invalid CIK: {cik:?}")));
    }
    trimmed
        .parse::<u64>()
        .map_err(|_| MarketError::InvalidInput(format!("invalid CIK: {cik:?}")))
}

/// Zero-pads a numeric CIK to the 10-digit canonical form.
#[must_use]
pub fn pad_cik(cik_numeric: u64) -> String {
    format!("{cik_numeric:010}")
}

/// Resolves free-text ticker/name queries against the SEC directory.
#[derive(Debug)]
pub struct EdgarCompanyResolver {
    client: Arc<RateLimitedHttpClient>,
    snapshot_path: PathBuf,
    directory_url: String,
    directory: OnceCell<Vec<TickerEntry>>,
}

impl EdgarCompanyResolver {
    /// Creates a resolver persisting its snapshot under `data_dir`.
    #[must_use]
    pub fn new(client: Arc<RateLimitedHttpClient>, data_dir: &Path) -> Self {
        Self::with_directory_url(client, data_dir, COMPANY_TICKERS_URL)
    }

    /// Creates a resolver fetching the directory from a custom URL.
    #[must_use]
    pub fn with_directory_url(
        client: Arc<RateLimitedHttpClient>,
        data_dir: &Path,
        directory_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            snapshot_path: data_dir.join(SNAPSHOT_FILE),
            directory_url: directory_url.into(),
            directory: OnceCell::new(),
        }
    }

    /// Searches the directory by ticker or company name.
    ///
    /// Matching is a case-insensitive substring test against both fields,
    /// capped at 25 candidates. Ranking: exact ticker match first, then
    /// ticker prefix matches, then alphabetical by ticker.
    pub async fn search(&self, query: &str) -> Result<Vec<Company>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let directory = self.load_directory().await?;
        Ok(search_directory(directory, query))
    }

    /// Loads the directory, preferring memory, then the local snapshot,
    /// then the network. A corrupt snapshot triggers a refetch.
    async fn load_directory(&self) -> Result<&[TickerEntry]> {
        let entries = self
            .directory
            .get_or_try_init(|| async {
                if let Some(entries) = self.read_snapshot().await {
                    debug!(count = entries.len(), "loaded ticker directory snapshot");
                    return Ok(entries);
                }

                debug!(url = %self.directory_url, "fetching ticker directory");
                let map: HashMap<String, TickerEntry> =
                    self.client.fetch_json(&self.directory_url).await?;
                let entries: Vec<TickerEntry> = map.into_values().collect();

                self.write_snapshot(&entries).await;
                Ok::<_, MarketError>(entries)
            })
            .await?;
        Ok(entries)
    }

    async fn read_snapshot(&self) -> Option<Vec<TickerEntry>> {
        let raw = tokio::fs::read(&self.snapshot_path).await.ok()?;
        match serde_json::from_slice(&raw) {
            Ok(entries) => Some(entries),
            Err(e) => {
                warn!(path = %self.snapshot_path.display(), error = %e, "corrupt ticker snapshot, refetching");
                None
            }
        }
    }

    async fn write_snapshot(&self, entries: &[TickerEntry]) {
        // Best-effort: a failed snapshot write only costs a refetch later.
        let write = async {
            if let Some(parent) = self.snapshot_path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let raw = serde_json::to_vec(entries)?;
            tokio::fs::write(&self.snapshot_path, raw).await?;
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(())
        };
        if let Err(e) = write.await {
            warn!(path = %self.snapshot_path.display(), error = %e, "failed to persist ticker snapshot");
        }
    }
}

/// Substring-matches and ranks directory entries for a query.
fn search_directory(entries: &[TickerEntry], query: &str) -> Vec<Company> {
    let lower = query.to_lowercase();

    let mut matches: Vec<Company> = Vec::new();
    for entry in entries {
        let ticker = entry.ticker.to_lowercase();
        let name = entry.title.to_lowercase();
        if ticker.contains(&lower) || name.contains(&lower) {
            matches.push(Company {
                cik: pad_cik(entry.cik_str),
                cik_numeric: entry.cik_str.to_string(),
                ticker: entry.ticker.clone(),
                name: entry.title.clone(),
            });
        }
        if matches.len() >= MAX_MATCHES {
            break;
        }
    }

    // Tie-break chain: exact ticker, ticker prefix, alphabetical by ticker.
    matches.sort_by(|a, b| {
        let ta = a.ticker.to_lowercase();
        let tb = b.ticker.to_lowercase();
        let exact = (tb == lower).cmp(&(ta == lower));
        if exact != std::cmp::Ordering::Equal {
            return exact;
        }
        let prefix = tb.starts_with(&lower).cmp(&ta.starts_with(&lower));
        if prefix != std::cmp::Ordering::Equal {
            return prefix;
        }
        a.ticker.cmp(&b.ticker)
    });

    matches
}
