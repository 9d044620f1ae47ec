#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/quotedesk/quotedesk/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for the quotedesk market-data layer.
//!
//! This crate provides the foundational abstractions shared by every other
//! crate in the workspace:
//!
//! - [`MarketDataProvider`](provider::MarketDataProvider) - Base trait for all providers
//! - [`QuoteProvider`](provider::QuoteProvider) - Snapshot quotes
//! - [`HistoricalProvider`](provider::HistoricalProvider) - Daily OHLCV history
//! - [`FundamentalsProvider`](provider::FundamentalsProvider) - Financial statements
//! - [`EtfProvider`](provider::EtfProvider) - ETF details
//! - [`ResponseCache`](cache::ResponseCache) - Generic TTL cache

/// Generic TTL response cache.
pub mod cache;
/// Error types for market-data operations.
pub mod error;
/// Provider traits for fetching market data.
pub mod provider;
/// Canonical data types (Symbol, Quote, bars, statements, ETF).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::{DEFAULT_TTL, ResponseCache};
pub use error::{MarketError, Result};
pub use provider::{
    EtfProvider, FundamentalsProvider, HistoricalProvider, MarketDataProvider, QuoteProvider,
    SymbolSearchProvider,
};
pub use types::{
    EtfHolding, EtfProfile, FinancialPeriod, FinancialReport, HistoricalBar, Quote, QuoteKind,
    Symbol, SymbolMatch, normalize_bars,
};
