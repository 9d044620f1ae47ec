//! Provider traits for fetching market data.
//!
//! This module defines the traits implemented by the concrete data sources:
//!
//! - [`MarketDataProvider`] - Base trait for all providers
//! - [`QuoteProvider`] - Snapshot quotes
//! - [`HistoricalProvider`] - Daily OHLCV history
//! - [`FundamentalsProvider`] - Annual financial statements
//! - [`EtfProvider`] - ETF expense ratio and holdings
//! - [`SymbolSearchProvider`] - Free-text symbol search

use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Debug;

use crate::{
    error::Result,
    types::{EtfProfile, FinancialReport, HistoricalBar, Quote, Symbol, SymbolMatch},
};

/// Base trait for all data providers.
pub trait MarketDataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g. "Yahoo Finance").
    fn name(&self) -> &str;
}

/// Provider for snapshot quotes.
#[async_trait]
pub trait QuoteProvider: MarketDataProvider {
    /// Fetches the current quote for a symbol.
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote>;
}

/// Provider for daily OHLCV history.
#[async_trait]
pub trait HistoricalProvider: MarketDataProvider {
    /// Fetches daily bars for a symbol between two dates, inclusive.
    ///
    /// Implementations return bars ascending by date with no duplicate
    /// dates. An empty vector means the provider had no data for the
    /// symbol/range; callers treat that as a miss, not an answer.
    async fn fetch_historical(
        &self,
        symbol: &Symbol,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<HistoricalBar>>;
}

/// Provider for annual financial statements.
#[async_trait]
pub trait FundamentalsProvider: MarketDataProvider {
    /// Fetches annual income statements and balance sheets for a symbol.
    async fn fetch_financials(&self, symbol: &Symbol) -> Result<FinancialReport>;
}

/// Provider for ETF details.
#[async_trait]
pub trait EtfProvider: MarketDataProvider {
    /// Fetches the expense ratio and top holdings for an ETF symbol.
    async fn fetch_etf_profile(&self, symbol: &Symbol) -> Result<EtfProfile>;
}

/// Provider for free-text symbol search.
#[async_trait]
pub trait SymbolSearchProvider: MarketDataProvider {
    /// Searches instruments by ticker or name.
    async fn search(&self, query: &str) -> Result<Vec<SymbolMatch>>;
}
