#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/quotedesk/quotedesk/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Financial Modeling Prep (FMP) market-data provider.
//!
//! Implements the quotedesk-core provider traits for the
//! [Financial Modeling Prep](https://financialmodelingprep.com/) stable API.
//! All requests are API-key gated; the gateway only constructs this provider
//! when a key is configured.

use async_trait::async_trait;
use chrono::NaiveDate;
use quotedesk_core::{
    EtfHolding, EtfProfile, EtfProvider, FinancialPeriod, FinancialReport, FundamentalsProvider,
    HistoricalBar, HistoricalProvider, MarketDataProvider, MarketError, Quote, QuoteProvider,
    Result, Symbol, SymbolMatch, SymbolSearchProvider, normalize_bars,
};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;

/// Base URL for the FMP stable API.
const FMP_BASE_URL: &str = "https://financialmodelingprep.com/stable";

/// Maximum symbol search rows requested from FMP.
const SEARCH_LIMIT: usize = 25;

/// Financial Modeling Prep data provider.
///
/// Provides snapshot quotes, daily OHLCV history, annual financial
/// statements, ETF profile/holdings, and symbol search.
#[derive(Clone)]
pub struct FmpProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl fmt::Debug for FmpProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FmpProvider")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl FmpProvider {
    /// Create a new FMP provider with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: FMP_BASE_URL.to_string(),
        }
    }

    /// Create a provider that talks to a non-default base URL.
    #[must_use]
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Build a URL with the API key appended.
    fn url(&self, endpoint: &str) -> String {
        if endpoint.contains('?') {
            format!("{}/{endpoint}&apikey={}", self.base_url, self.api_key)
        } else {
            format!("{}/{endpoint}?apikey={}", self.base_url, self.api_key)
        }
    }

    /// Make a GET request and parse the JSON response.
    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.url(endpoint);
        tracing::debug!("FMP request: {}", endpoint);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketError::RateLimited {
                host: "financialmodelingprep.com".to_string(),
                attempts: 1,
            });
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            return Err(MarketError::Http {
                status,
                url: response.url().to_string(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        // FMP reports key and plan problems as 200s with an error body.
        if text.contains("\"Error Message\"") || text.contains("\"error\"") {
            return Err(MarketError::ProviderUnavailable(text));
        }

        serde_json::from_str(&text).map_err(|e| MarketError::Decode(format!("{e}: {text}")))
    }

    async fn fetch_income_statements(&self, symbol: &Symbol) -> Result<Vec<FmpIncomeStatement>> {
        let endpoint = format!("income-statement?symbol={}&period=annual", symbol.as_str());
        self.get(&endpoint).await
    }

    async fn fetch_balance_sheets(&self, symbol: &Symbol) -> Result<Vec<FmpBalanceSheet>> {
        let endpoint = format!(
            "balance-sheet-statement?symbol={}&period=annual",
            symbol.as_str()
        );
        self.get(&endpoint).await
    }

    async fn fetch_etf_info(&self, symbol: &Symbol) -> Result<Vec<FmpEtfInfo>> {
        let endpoint = format!("etf/info?symbol={}", symbol.as_str());
        self.get(&endpoint).await
    }

    async fn fetch_etf_holdings(&self, symbol: &Symbol) -> Result<Vec<FmpEtfHolding>> {
        let endpoint = format!("etf/holdings?symbol={}", symbol.as_str());
        self.get(&endpoint).await
    }
}

impl MarketDataProvider for FmpProvider {
    fn name(&self) -> &str {
        "FMP"
    }
}

#[async_trait]
impl QuoteProvider for FmpProvider {
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote> {
        let endpoint = format!("quote?symbol={}", symbol.as_str());
        let quotes: Vec<FmpQuote> = self.get(&endpoint).await?;
        let raw = quotes
            .into_iter()
            .next()
            .ok_or_else(|| MarketError::NotFound(format!("no quote for {symbol}")))?;

        Ok(Quote {
            symbol: Symbol::new(&raw.symbol),
            name: raw.name,
            price: raw.price,
            previous_close: raw.previous_close,
            change: raw.change,
            change_percent: raw.change_percentage,
            market_cap: raw.market_cap,
            volume: raw.volume,
            day_high: raw.day_high,
            day_low: raw.day_low,
            week52_high: raw.year_high,
            week52_low: raw.year_low,
            trailing_pe: raw.pe,
            ..Default::default()
        }
        .with_derived_change())
    }
}

#[async_trait]
impl HistoricalProvider for FmpProvider {
    async fn fetch_historical(
        &self,
        symbol: &Symbol,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<HistoricalBar>> {
        let endpoint = format!(
            "historical-price-eod/full?symbol={}&from={from}&to={to}",
            symbol.as_str()
        );
        let prices: Vec<FmpHistoricalPrice> = self.get(&endpoint).await?;

        let bars = prices
            .into_iter()
            .filter_map(|p| {
                let date = NaiveDate::parse_from_str(&p.date, "%Y-%m-%d").ok()?;
                Some(HistoricalBar {
                    date,
                    open: p.open,
                    high: p.high,
                    low: p.low,
                    close: p.close,
                    volume: p.volume as u64,
                })
            })
            .collect();

        Ok(normalize_bars(bars))
    }
}

#[async_trait]
impl FundamentalsProvider for FmpProvider {
    async fn fetch_financials(&self, symbol: &Symbol) -> Result<FinancialReport> {
        let (income_result, balance_result) = tokio::join!(
            self.fetch_income_statements(symbol),
            self.fetch_balance_sheets(symbol),
        );
        let income = income_result?;
        let balance = balance_result?;

        let income_annual = income
            .into_iter()
            .filter_map(|s| {
                let period_end = NaiveDate::parse_from_str(&s.date, "%Y-%m-%d").ok()?;
                Some(FinancialPeriod {
                    period_end,
                    revenue: s.revenue,
                    gross_profit: s.gross_profit,
                    operating_income: s.operating_income,
                    net_income: s.net_income,
                    ..Default::default()
                })
            })
            .collect();

        let balance_annual = balance
            .into_iter()
            .filter_map(|s| {
                let period_end = NaiveDate::parse_from_str(&s.date, "%Y-%m-%d").ok()?;
                Some(FinancialPeriod {
                    period_end,
                    total_assets: s.total_assets,
                    total_liabilities: s.total_liabilities,
                    total_equity: s.total_stockholders_equity,
                    ..Default::default()
                })
            })
            .collect();

        Ok(FinancialReport {
            income_annual,
            balance_annual,
        })
    }
}

#[async_trait]
impl EtfProvider for FmpProvider {
    async fn fetch_etf_profile(&self, symbol: &Symbol) -> Result<EtfProfile> {
        let (info_result, holdings_result) = tokio::join!(
            self.fetch_etf_info(symbol),
            self.fetch_etf_holdings(symbol),
        );

        // FMP expense ratios and weights use the percent convention;
        // canonical shapes carry fractions, converted here exactly once.
        let expense_ratio = info_result?
            .into_iter()
            .next()
            .and_then(|i| i.expense_ratio)
            .map(|pct| pct / 100.0);

        let top_holdings = holdings_result?
            .into_iter()
            .map(|h| EtfHolding {
                symbol: h.asset,
                name: h.name,
                weight: h.weight_percentage.map(|pct| pct / 100.0),
            })
            .collect();

        Ok(EtfProfile {
            expense_ratio,
            top_holdings,
        })
    }
}

#[async_trait]
impl SymbolSearchProvider for FmpProvider {
    async fn search(&self, query: &str) -> Result<Vec<SymbolMatch>> {
        let endpoint = format!("search-symbol?query={query}&limit={SEARCH_LIMIT}");
        let rows: Vec<FmpSearchRow> = self.get(&endpoint).await?;

        Ok(rows
            .into_iter()
            .map(|r| SymbolMatch {
                symbol: Symbol::new(&r.symbol),
                name: r.name,
                exchange: r.exchange,
                kind: None,
            })
            .collect())
    }
}

// FMP API response types.

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FmpQuote {
    symbol: String,
    name: Option<String>,
    price: Option<f64>,
    previous_close: Option<f64>,
    change: Option<f64>,
    change_percentage: Option<f64>,
    market_cap: Option<f64>,
    volume: Option<f64>,
    day_high: Option<f64>,
    day_low: Option<f64>,
    year_high: Option<f64>,
    year_low: Option<f64>,
    pe: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct FmpHistoricalPrice {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FmpIncomeStatement {
    date: String,
    revenue: Option<f64>,
    gross_profit: Option<f64>,
    operating_income: Option<f64>,
    net_income: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FmpBalanceSheet {
    date: String,
    total_assets: Option<f64>,
    total_liabilities: Option<f64>,
    total_stockholders_equity: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FmpEtfInfo {
    expense_ratio: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FmpEtfHolding {
    asset: String,
    name: Option<String>,
    weight_percentage: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct FmpSearchRow {
    symbol: String,
    name: Option<String>,
    #[serde(default)]
    exchange: Option<String>,
}
