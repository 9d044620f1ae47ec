#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/quotedesk/quotedesk/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use quotedesk::{App, AppConfig};
//! # use quotedesk_core::Result;
//! # #[derive(Debug)]
//! # struct ShellConverter;
//! # #[async_trait::async_trait]
//! # impl quotedesk_edgar::DocumentConverter for ShellConverter {
//! #     async fn convert_to_pdf(&self, _url: &str, _dest: &std::path::Path) -> Result<()> { Ok(()) }
//! # }
//!
//! # async fn example() {
//! let config = AppConfig::from_env("quotedesk/0.1 (ops@example.com)", "./data");
//! let app = App::new(&config, Arc::new(ShellConverter));
//!
//! let quote = app.get_quote("AAPL").await;
//! assert!(quote.ok || quote.error.is_some());
//! # }
//! ```

/// UI-facing envelope API.
pub mod api;
/// Application configuration.
pub mod config;
/// Cached, fallback-aware market-data access.
pub mod gateway;

pub use api::{ApiError, ApiResponse, App};
pub use config::{AppConfig, FMP_API_KEY_ENV};
pub use gateway::{
    FetchOrigin, Fetched, FullMarketProvider, GatewayPriceSource, MarketDataGateway,
};
