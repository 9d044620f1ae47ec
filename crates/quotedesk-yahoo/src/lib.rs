#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/quotedesk/quotedesk/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Yahoo Finance market-data provider.
//!
//! Keyless secondary source. Quotes come from the v7 quote endpoint, OHLCV
//! history from the v8 chart API, financial statements and ETF details from
//! v10 quoteSummary modules, and symbol search from the v1 search endpoint.
//! Numeric quoteSummary values arrive wrapped as `{ "raw": ... }` objects.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use quotedesk_core::{
    EtfHolding, EtfProfile, EtfProvider, FinancialPeriod, FinancialReport, FundamentalsProvider,
    HistoricalBar, HistoricalProvider, MarketDataProvider, MarketError, Quote, QuoteKind,
    QuoteProvider, Result, Symbol, SymbolMatch, SymbolSearchProvider, normalize_bars,
};
use serde::Deserialize;
use tokio::time::sleep;
use tracing::debug;

/// Yahoo Finance API base URL.
const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Default spacing between requests in milliseconds.
const DEFAULT_RATE_LIMIT_MS: u64 = 1000;

/// User agent for HTTP requests. Yahoo rejects the default reqwest agent.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Yahoo Finance data provider.
#[derive(Debug)]
pub struct YahooProvider {
    client: reqwest::Client,
    base_url: String,
    rate_limit_ms: u64,
    last_request_time: AtomicU64,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider with default settings.
    ///
    /// Uses built-in spacing of 1 request per second.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rate_limit(Duration::from_millis(DEFAULT_RATE_LIMIT_MS))
    }

    /// Create a provider with custom request spacing.
    #[must_use]
    pub fn with_rate_limit(rate_limit: Duration) -> Self {
        Self {
            client: build_client(),
            base_url: YAHOO_BASE_URL.to_string(),
            rate_limit_ms: rate_limit.as_millis() as u64,
            last_request_time: AtomicU64::new(0),
        }
    }

    /// Create a provider that talks to a non-default base URL, without
    /// request spacing.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.into(),
            rate_limit_ms: 0,
            last_request_time: AtomicU64::new(0),
        }
    }

    /// Apply request spacing before making a request.
    async fn apply_rate_limit(&self) {
        if self.rate_limit_ms == 0 {
            return;
        }
        let now = unix_millis();
        let last = self.last_request_time.load(Ordering::Relaxed);
        let elapsed = now.saturating_sub(last);

        if elapsed < self.rate_limit_ms {
            let wait_time = self.rate_limit_ms - elapsed;
            debug!("Rate limiting: waiting {}ms", wait_time);
            sleep(Duration::from_millis(wait_time)).await;
        }

        self.last_request_time
            .store(unix_millis(), Ordering::Relaxed);
    }

    /// Make a GET request against a base-relative path and parse the JSON
    /// response.
    async fn get<T: serde::de::DeserializeOwned>(&self, path_and_query: &str) -> Result<T> {
        self.apply_rate_limit().await;

        let url = format!("{}{}", self.base_url, path_and_query);
        debug!("Yahoo request: {}", path_and_query);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketError::RateLimited {
                host: "finance.yahoo.com".to_string(),
                attempts: 1,
            });
        }

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketError::NotFound(url));
        }

        if !response.status().is_success() {
            return Err(MarketError::Http {
                status: response.status().as_u16(),
                url: response.url().to_string(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| MarketError::Decode(e.to_string()))
    }

    /// Fetch the requested quoteSummary modules for a symbol.
    async fn fetch_quote_summary(&self, symbol: &Symbol, modules: &str) -> Result<SummaryData> {
        let path = format!(
            "/v10/finance/quoteSummary/{}?modules={modules}",
            symbol.as_str()
        );
        let response: QuoteSummaryResponse = self.get(&path).await?;
        response
            .quote_summary
            .result
            .into_iter()
            .next()
            .ok_or_else(|| MarketError::NotFound(format!("no summary data for {symbol}")))
    }
}

fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_default()
}

fn unix_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }
}

#[async_trait]
impl QuoteProvider for YahooProvider {
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote> {
        let path = format!("/v7/finance/quote?symbols={}", symbol.as_str());
        let response: QuoteResponse = self.get(&path).await?;
        let raw = response
            .quote_response
            .result
            .into_iter()
            .next()
            .ok_or_else(|| MarketError::NotFound(format!("no quote for {symbol}")))?;

        let kind = match raw.quote_type.as_deref() {
            Some("ETF") => QuoteKind::Etf,
            _ => QuoteKind::Equity,
        };

        Ok(Quote {
            symbol: Symbol::new(&raw.symbol),
            name: raw.long_name.or(raw.short_name),
            kind,
            price: raw.regular_market_price,
            previous_close: raw.regular_market_previous_close,
            change: raw.regular_market_change,
            change_percent: raw.regular_market_change_percent,
            market_cap: raw.market_cap,
            volume: raw.regular_market_volume,
            day_high: raw.regular_market_day_high,
            day_low: raw.regular_market_day_low,
            week52_high: raw.fifty_two_week_high,
            week52_low: raw.fifty_two_week_low,
            trailing_pe: raw.trailing_pe,
            forward_pe: raw.forward_pe,
            price_to_book: raw.price_to_book,
            price_to_sales: None,
        }
        .with_derived_change())
    }
}

#[async_trait]
impl HistoricalProvider for YahooProvider {
    async fn fetch_historical(
        &self,
        symbol: &Symbol,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<HistoricalBar>> {
        if from > to {
            return Err(MarketError::InvalidInput(format!(
                "start date {from} is after end date {to}"
            )));
        }

        let period1 = from
            .and_hms_opt(0, 0, 0)
            .map(|dt| Utc.from_utc_datetime(&dt).timestamp())
            .unwrap_or(0);
        let period2 = to
            .and_hms_opt(23, 59, 59)
            .map(|dt| Utc.from_utc_datetime(&dt).timestamp())
            .unwrap_or(0);

        let path = format!(
            "/v8/finance/chart/{}?period1={period1}&period2={period2}&interval=1d",
            symbol.as_str()
        );
        let response: ChartResponse = self.get(&path).await?;

        if let Some(error) = response.chart.error {
            if error.code == "Not Found" {
                return Err(MarketError::NotFound(symbol.to_string()));
            }
            return Err(MarketError::ProviderUnavailable(format!(
                "{}: {}",
                error.code, error.description
            )));
        }

        let data = response
            .chart
            .result
            .into_iter()
            .next()
            .ok_or_else(|| MarketError::NotFound(symbol.to_string()))?;

        let timestamps = data.timestamp.unwrap_or_default();
        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| MarketError::Decode("missing quote data".to_string()))?;

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let Some(date) = Utc
                .timestamp_opt(ts, 0)
                .single()
                .map(|dt: DateTime<Utc>| dt.date_naive())
            else {
                continue;
            };
            // Yahoo pads gap days with nulls; a bar needs all four prices.
            let (Some(open), Some(high), Some(low), Some(close)) = (
                value_at(&quote.open, i),
                value_at(&quote.high, i),
                value_at(&quote.low, i),
                value_at(&quote.close, i),
            ) else {
                continue;
            };
            bars.push(HistoricalBar {
                date,
                open,
                high,
                low,
                close,
                volume: value_at(&quote.volume, i).unwrap_or(0),
            });
        }

        Ok(normalize_bars(bars))
    }
}

fn value_at<T: Copy>(values: &[Option<T>], index: usize) -> Option<T> {
    values.get(index).copied().flatten()
}

#[async_trait]
impl FundamentalsProvider for YahooProvider {
    async fn fetch_financials(&self, symbol: &Symbol) -> Result<FinancialReport> {
        let summary = self
            .fetch_quote_summary(symbol, "incomeStatementHistory,balanceSheetHistory")
            .await?;

        let income_annual = summary
            .income_statement_history
            .map(|h| h.income_statement_history)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|s| {
                Some(FinancialPeriod {
                    period_end: raw_date(&s.end_date)?,
                    revenue: raw_value(&s.total_revenue),
                    gross_profit: raw_value(&s.gross_profit),
                    operating_income: raw_value(&s.operating_income),
                    net_income: raw_value(&s.net_income),
                    ..Default::default()
                })
            })
            .collect();

        let balance_annual = summary
            .balance_sheet_history
            .map(|h| h.balance_sheet_statements)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|s| {
                Some(FinancialPeriod {
                    period_end: raw_date(&s.end_date)?,
                    total_assets: raw_value(&s.total_assets),
                    total_liabilities: raw_value(&s.total_liab),
                    total_equity: raw_value(&s.total_stockholder_equity),
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
impl EtfProvider for YahooProvider {
    async fn fetch_etf_profile(&self, symbol: &Symbol) -> Result<EtfProfile> {
        let summary = self
            .fetch_quote_summary(symbol, "fundProfile,topHoldings")
            .await?;

        // Yahoo already reports these as fractions; no conversion here.
        let expense_ratio = summary
            .fund_profile
            .and_then(|p| p.fees_expenses_investment)
            .and_then(|f| raw_value(&f.annual_report_expense_ratio));

        let top_holdings = summary
            .top_holdings
            .map(|t| t.holdings)
            .unwrap_or_default()
            .into_iter()
            .map(|h| EtfHolding {
                symbol: h.symbol,
                name: h.holding_name,
                weight: raw_value(&h.holding_percent),
            })
            .collect();

        Ok(EtfProfile {
            expense_ratio,
            top_holdings,
        })
    }
}

#[async_trait]
impl SymbolSearchProvider for YahooProvider {
    async fn search(&self, query: &str) -> Result<Vec<SymbolMatch>> {
        let path = format!("/v1/finance/search?q={query}");
        let response: SearchResponse = self.get(&path).await?;

        Ok(response
            .quotes
            .into_iter()
            .filter(|q| !q.symbol.is_empty())
            .map(|q| {
                let kind = match q.quote_type.as_deref() {
                    Some("ETF") => Some(QuoteKind::Etf),
                    Some("EQUITY") => Some(QuoteKind::Equity),
                    _ => None,
                };
                SymbolMatch {
                    symbol: Symbol::new(&q.symbol),
                    name: q.longname.or(q.shortname),
                    exchange: q.exchange,
                    kind,
                }
            })
            .collect())
    }
}

fn raw_value(value: &Option<RawValue>) -> Option<f64> {
    value.as_ref().and_then(|v| v.raw)
}

fn raw_date(value: &Option<RawValue>) -> Option<NaiveDate> {
    let secs = raw_value(value)? as i64;
    Utc.timestamp_opt(secs, 0).single().map(|dt| dt.date_naive())
}

// Yahoo Finance API response types.

/// A numeric value wrapped Yahoo-style as `{ "raw": 1.23, "fmt": "1.23" }`.
#[derive(Debug, Clone, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResponse {
    quote_response: QuoteResponseInner,
}

#[derive(Debug, Deserialize)]
struct QuoteResponseInner {
    result: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooQuote {
    symbol: String,
    long_name: Option<String>,
    short_name: Option<String>,
    quote_type: Option<String>,
    regular_market_price: Option<f64>,
    regular_market_previous_close: Option<f64>,
    regular_market_change: Option<f64>,
    regular_market_change_percent: Option<f64>,
    market_cap: Option<f64>,
    regular_market_volume: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    fifty_two_week_high: Option<f64>,
    fifty_two_week_low: Option<f64>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<f64>,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<f64>,
    price_to_book: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    result: Vec<ChartData>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummaryResult,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    #[serde(default)]
    result: Vec<SummaryData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryData {
    income_statement_history: Option<IncomeStatementHistory>,
    balance_sheet_history: Option<BalanceSheetHistory>,
    fund_profile: Option<FundProfile>,
    top_holdings: Option<TopHoldings>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeStatementHistory {
    #[serde(default)]
    income_statement_history: Vec<IncomeStatement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncomeStatement {
    end_date: Option<RawValue>,
    total_revenue: Option<RawValue>,
    gross_profit: Option<RawValue>,
    operating_income: Option<RawValue>,
    net_income: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceSheetHistory {
    #[serde(default)]
    balance_sheet_statements: Vec<BalanceSheet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceSheet {
    end_date: Option<RawValue>,
    total_assets: Option<RawValue>,
    total_liab: Option<RawValue>,
    total_stockholder_equity: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FundProfile {
    fees_expenses_investment: Option<FeesExpenses>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeesExpenses {
    annual_report_expense_ratio: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopHoldings {
    #[serde(default)]
    holdings: Vec<Holding>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Holding {
    symbol: String,
    holding_name: Option<String>,
    holding_percent: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchQuote {
    #[serde(default)]
    symbol: String,
    shortname: Option<String>,
    longname: Option<String>,
    exchange: Option<String>,
    quote_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn quote_maps_v7_fields_and_detects_etfs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v7/finance/quote"))
            .and(query_param("symbols", "VOO"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "quoteResponse": { "result": [{
                    "symbol": "VOO",
                    "longName": "Vanguard S&P 500 ETF",
                    "quoteType": "ETF",
                    "regularMarketPrice": 420.0,
                    "regularMarketPreviousClose": 400.0,
                    "fiftyTwoWeekHigh": 430.0
                }] }
            })))
            .mount(&server)
            .await;

        let provider = YahooProvider::with_base_url(server.uri());
        let quote = provider.fetch_quote(&Symbol::new("VOO")).await.unwrap();

        assert_eq!(quote.kind, QuoteKind::Etf);
        assert_eq!(quote.change, Some(20.0));
        assert_eq!(quote.change_percent, Some(5.0));
        assert_eq!(quote.week52_high, Some(430.0));
    }

    #[tokio::test]
    async fn chart_gap_days_are_dropped() {
        let server = MockServer::start().await;
        // 2024-01-01 and 2024-01-03; the middle day has null prices.
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/AAPL"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "chart": {
                    "result": [{
                        "timestamp": [1_704_067_200, 1_704_153_600, 1_704_240_000],
                        "indicators": { "quote": [{
                            "open":   [1.0, null, 3.0],
                            "high":   [1.0, null, 3.0],
                            "low":    [1.0, null, 3.0],
                            "close":  [1.0, null, 3.0],
                            "volume": [10, null, 30]
                        }] }
                    }],
                    "error": null
                }
            })))
            .mount(&server)
            .await;

        let provider = YahooProvider::with_base_url(server.uri());
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let bars = provider
            .fetch_historical(&Symbol::new("AAPL"), from, to)
            .await
            .unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 1.0);
        assert_eq!(bars[1].close, 3.0);
    }

    #[tokio::test]
    async fn chart_error_code_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/NOPE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "chart": {
                    "result": [],
                    "error": { "code": "Not Found", "description": "No data found" }
                }
            })))
            .mount(&server)
            .await;

        let provider = YahooProvider::with_base_url(server.uri());
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let err = provider
            .fetch_historical(&Symbol::new("NOPE"), from, to)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "NotFound");
    }

    #[tokio::test]
    async fn reversed_date_range_is_rejected_before_network() {
        let provider = YahooProvider::with_base_url("http://127.0.0.1:1");
        let from = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let err = provider
            .fetch_historical(&Symbol::new("AAPL"), from, to)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidInput");
    }

    #[tokio::test]
    async fn financials_unwrap_raw_values() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v10/finance/quoteSummary/AAPL"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "quoteSummary": { "result": [{
                    "incomeStatementHistory": { "incomeStatementHistory": [{
                        "endDate": { "raw": 1_703_980_800, "fmt": "2023-12-31" },
                        "totalRevenue": { "raw": 100.0 },
                        "netIncome": { "raw": 20.0 }
                    }] },
                    "balanceSheetHistory": { "balanceSheetStatements": [{
                        "endDate": { "raw": 1_703_980_800 },
                        "totalAssets": { "raw": 500.0 },
                        "totalStockholderEquity": { "raw": 200.0 }
                    }] }
                }] }
            })))
            .mount(&server)
            .await;

        let provider = YahooProvider::with_base_url(server.uri());
        let report = provider
            .fetch_financials(&Symbol::new("AAPL"))
            .await
            .unwrap();

        assert_eq!(report.income_annual.len(), 1);
        assert_eq!(report.income_annual[0].revenue, Some(100.0));
        assert_eq!(
            report.income_annual[0].period_end,
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
        );
        assert_eq!(report.balance_annual[0].total_equity, Some(200.0));
    }

    #[tokio::test]
    async fn etf_fractions_pass_through_unscaled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v10/finance/quoteSummary/VOO"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "quoteSummary": { "result": [{
                    "fundProfile": { "feesExpensesInvestment": {
                        "annualReportExpenseRatio": { "raw": 0.0003 }
                    } },
                    "topHoldings": { "holdings": [{
                        "symbol": "AAPL",
                        "holdingName": "Apple Inc.",
                        "holdingPercent": { "raw": 0.075 }
                    }] }
                }] }
            })))
            .mount(&server)
            .await;

        let provider = YahooProvider::with_base_url(server.uri());
        let profile = provider
            .fetch_etf_profile(&Symbol::new("VOO"))
            .await
            .unwrap();

        assert_eq!(profile.expense_ratio, Some(0.0003));
        assert_eq!(profile.top_holdings[0].weight, Some(0.075));
    }

    #[tokio::test]
    async fn search_maps_quote_types() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/finance/search"))
            .and(query_param("q", "apple"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "quotes": [
                    { "symbol": "AAPL", "shortname": "Apple Inc.",
                      "exchange": "NMS", "quoteType": "EQUITY" },
                    { "symbol": "", "quoteType": "NEWS" }
                ]
            })))
            .mount(&server)
            .await;

        let provider = YahooProvider::with_base_url(server.uri());
        let matches = provider.search("apple").await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].symbol.as_str(), "AAPL");
        assert_eq!(matches[0].kind, Some(QuoteKind::Equity));
    }
}
