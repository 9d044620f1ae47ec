#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/quotedesk/quotedesk/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC EDGAR access layer.
//!
//! Everything here talks to the regulator through one shared
//! [`RateLimitedHttpClient`], so the SEC's fair-access spacing rule holds
//! across all callers regardless of which UI action originated a request.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use quotedesk_edgar::{ClientConfig, EdgarCompanyResolver, FilingsStore, RateLimitedHttpClient};
//!
//! # async fn example() -> quotedesk_core::Result<()> {
//! let client = Arc::new(RateLimitedHttpClient::new(ClientConfig::new(
//!     "MyApp/1.0 (contact@example.com)",
//! )));
//! let resolver = EdgarCompanyResolver::new(client.clone(), Path::new("./data"));
//! let filings = FilingsStore::new(client, Path::new("./data"));
//!
//! let companies = resolver.search("AAPL").await?;
//! let record = filings
//!     .list_filings(&companies[0].cik, &["10-K".to_string()], false)
//!     .await?;
//! println!("{} filings", record.filings.len());
//! # Ok(())
//! # }
//! ```

/// Throttled HTTP client for SEC hosts.
pub mod client;
/// Filing document location and download.
pub mod documents;
/// Durable per-company filing history.
pub mod filings;
/// Ticker/name to CIK resolution.
pub mod resolver;

pub use client::{ClientConfig, RateLimitedHttpClient};
pub use documents::{DocumentConverter, FilingDocumentLocator};
pub use filings::{Filing, FilingsCacheRecord, FilingsStore};
pub use resolver::{Company, EdgarCompanyResolver, pad_cik, parse_cik};
