//! Cached, fallback-aware market-data access.
//!
//! One algorithm serves all four data kinds: normalize the symbol, prefer
//! the cache, then the primary provider, then the secondary. An empty
//! primary result counts as a failure because providers can answer HTTP 200
//! with an empty array for an unsupported symbol. The secondary's error is
//! final. Successful answers are written through the per-kind cache.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use quotedesk_alerts::PriceSource;
use quotedesk_core::{
    EtfProfile, EtfProvider, FinancialReport, FundamentalsProvider, HistoricalBar,
    HistoricalProvider, MarketError, Quote, QuoteProvider, ResponseCache, Result, Symbol,
    SymbolMatch, SymbolSearchProvider,
};
use tracing::{debug, warn};

/// A provider that can answer every market-data kind the gateway serves.
pub trait FullMarketProvider:
    QuoteProvider + HistoricalProvider + FundamentalsProvider + EtfProvider + SymbolSearchProvider
{
}

impl<T> FullMarketProvider for T where
    T: QuoteProvider
        + HistoricalProvider
        + FundamentalsProvider
        + EtfProvider
        + SymbolSearchProvider
{
}

/// Where a fetched value came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOrigin {
    /// Served from the in-memory cache.
    Cache,
    /// Answered by the primary provider.
    Primary,
    /// Answered by the secondary provider.
    Secondary,
}

/// A gateway answer with its provenance.
///
/// `primary_error` carries the swallowed primary failure when the secondary
/// ended up answering, so callers can log why the fallback ran without the
/// external contract changing.
#[derive(Debug)]
pub struct Fetched<T> {
    /// The normalized payload.
    pub data: T,
    /// When the payload was fetched from a provider.
    pub fetched_at: DateTime<Utc>,
    /// Cache, primary, or secondary.
    pub origin: FetchOrigin,
    /// The primary provider's failure, when the secondary answered.
    pub primary_error: Option<MarketError>,
}

/// Orchestrates cache, primary provider, and secondary provider for the
/// four market-data kinds, plus uncached symbol search.
#[derive(Debug)]
pub struct MarketDataGateway {
    primary: Option<Arc<dyn FullMarketProvider>>,
    secondary: Arc<dyn FullMarketProvider>,
    quotes: ResponseCache<Symbol, Quote>,
    historical: ResponseCache<(Symbol, NaiveDate, NaiveDate), Vec<HistoricalBar>>,
    financials: ResponseCache<Symbol, FinancialReport>,
    etf: ResponseCache<Symbol, EtfProfile>,
}

impl MarketDataGateway {
    /// Creates a gateway with the default 60 s cache TTL.
    #[must_use]
    pub fn new(
        primary: Option<Arc<dyn FullMarketProvider>>,
        secondary: Arc<dyn FullMarketProvider>,
    ) -> Self {
        Self {
            primary,
            secondary,
            quotes: ResponseCache::new(),
            historical: ResponseCache::new(),
            financials: ResponseCache::new(),
            etf: ResponseCache::new(),
        }
    }

    /// Creates a gateway with a custom cache TTL.
    #[must_use]
    pub fn with_ttl(
        primary: Option<Arc<dyn FullMarketProvider>>,
        secondary: Arc<dyn FullMarketProvider>,
        ttl: Duration,
    ) -> Self {
        Self {
            primary,
            secondary,
            quotes: ResponseCache::with_ttl(ttl),
            historical: ResponseCache::with_ttl(ttl),
            financials: ResponseCache::with_ttl(ttl),
            etf: ResponseCache::with_ttl(ttl),
        }
    }

    /// Fetches the current quote for a symbol.
    pub async fn get_quote(&self, symbol: &Symbol) -> Result<Fetched<Quote>> {
        check_symbol(symbol)?;
        if let Some((data, fetched_at)) = self.quotes.get(symbol).await {
            debug!(%symbol, "quote cache hit");
            return Ok(cached(data, fetched_at));
        }

        let sym = symbol.clone();
        let (data, origin, primary_error) = self
            .fetch_with_fallback(
                "quote",
                move |p| {
                    let s = sym.clone();
                    async move { p.fetch_quote(&s).await }
                },
                |_| true,
            )
            .await?;
        self.quotes.put(symbol.clone(), data.clone()).await;
        Ok(fresh(data, origin, primary_error))
    }

    /// Fetches daily bars for a symbol between two dates, inclusive.
    pub async fn get_historical(
        &self,
        symbol: &Symbol,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Fetched<Vec<HistoricalBar>>> {
        check_symbol(symbol)?;
        let key = (symbol.clone(), from, to);
        if let Some((data, fetched_at)) = self.historical.get(&key).await {
            debug!(%symbol, %from, %to, "historical cache hit");
            return Ok(cached(data, fetched_at));
        }

        let sym = symbol.clone();
        let (data, origin, primary_error) = self
            .fetch_with_fallback(
                "historical bars",
                move |p| {
                    let s = sym.clone();
                    async move { p.fetch_historical(&s, from, to).await }
                },
                |bars: &Vec<HistoricalBar>| !bars.is_empty(),
            )
            .await?;
        self.historical.put(key, data.clone()).await;
        Ok(fresh(data, origin, primary_error))
    }

    /// Fetches annual financial statements for a symbol.
    pub async fn get_financials(&self, symbol: &Symbol) -> Result<Fetched<FinancialReport>> {
        check_symbol(symbol)?;
        if let Some((data, fetched_at)) = self.financials.get(symbol).await {
            debug!(%symbol, "financials cache hit");
            return Ok(cached(data, fetched_at));
        }

        let sym = symbol.clone();
        let (data, origin, primary_error) = self
            .fetch_with_fallback(
                "financials",
                move |p| {
                    let s = sym.clone();
                    async move { p.fetch_financials(&s).await }
                },
                |report: &FinancialReport| !report.is_empty(),
            )
            .await?;
        self.financials.put(symbol.clone(), data.clone()).await;
        Ok(fresh(data, origin, primary_error))
    }

    /// Fetches the expense ratio and top holdings for an ETF symbol.
    pub async fn get_etf_profile(&self, symbol: &Symbol) -> Result<Fetched<EtfProfile>> {
        check_symbol(symbol)?;
        if let Some((data, fetched_at)) = self.etf.get(symbol).await {
            debug!(%symbol, "ETF profile cache hit");
            return Ok(cached(data, fetched_at));
        }

        let sym = symbol.clone();
        let (data, origin, primary_error) = self
            .fetch_with_fallback(
                "ETF profile",
                move |p| {
                    let s = sym.clone();
                    async move { p.fetch_etf_profile(&s).await }
                },
                |profile: &EtfProfile| !profile.is_empty(),
            )
            .await?;
        self.etf.put(symbol.clone(), data.clone()).await;
        Ok(fresh(data, origin, primary_error))
    }

    /// Searches instruments by ticker or name. Not cached.
    pub async fn search(&self, query: &str) -> Result<Vec<SymbolMatch>> {
        let query = query.trim().to_string();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let (matches, _, _) = self
            .fetch_with_fallback(
                "symbol search",
                move |p| {
                    let q = query.clone();
                    async move { p.search(&q).await }
                },
                |rows: &Vec<SymbolMatch>| !rows.is_empty(),
            )
            .await?;
        Ok(matches)
    }

    /// Primary-then-secondary provider preference shared by all kinds.
    ///
    /// `accept` decides whether a successful primary answer is usable; a
    /// rejected one (typically empty) is treated as a failure so the
    /// secondary still gets a chance. The secondary's answer is final
    /// either way.
    async fn fetch_with_fallback<T, F, Fut>(
        &self,
        what: &str,
        call: F,
        accept: fn(&T) -> bool,
    ) -> Result<(T, FetchOrigin, Option<MarketError>)>
    where
        F: Fn(Arc<dyn FullMarketProvider>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut primary_error = None;
        if let Some(primary) = &self.primary {
            match call(primary.clone()).await {
                Ok(data) if accept(&data) => {
                    debug!(provider = primary.name(), what, "primary answered");
                    return Ok((data, FetchOrigin::Primary, None));
                }
                Ok(_) => {
                    warn!(provider = primary.name(), what, "primary returned no data, falling back");
                    primary_error = Some(MarketError::NotFound(format!(
                        "{} returned no {what}",
                        primary.name()
                    )));
                }
                Err(e) => {
                    warn!(provider = primary.name(), what, error = %e, "primary failed, falling back");
                    primary_error = Some(e);
                }
            }
        }

        match call(self.secondary.clone()).await {
            Ok(data) => {
                debug!(provider = self.secondary.name(), what, "secondary answered");
                Ok((data, FetchOrigin::Secondary, primary_error))
            }
            Err(e) => {
                warn!(provider = self.secondary.name(), what, error = %e, "secondary failed");
                Err(e)
            }
        }
    }
}

fn check_symbol(symbol: &Symbol) -> Result<()> {
    if symbol.is_empty() {
        return Err(MarketError::InvalidInput("empty symbol".to_string()));
    }
    Ok(())
}

fn cached<T>(data: T, fetched_at: DateTime<Utc>) -> Fetched<T> {
    Fetched {
        data,
        fetched_at,
        origin: FetchOrigin::Cache,
        primary_error: None,
    }
}

fn fresh<T>(data: T, origin: FetchOrigin, primary_error: Option<MarketError>) -> Fetched<T> {
    Fetched {
        data,
        fetched_at: Utc::now(),
        origin,
        primary_error,
    }
}

/// Adapter exposing the gateway as the alert evaluator's price source.
///
/// Reuses the quote path, so alert sweeps benefit from the same cache and
/// fallback behavior as interactive quote requests.
#[derive(Clone, Debug)]
pub struct GatewayPriceSource {
    gateway: Arc<MarketDataGateway>,
}

impl GatewayPriceSource {
    /// Wraps a gateway handle.
    #[must_use]
    pub fn new(gateway: Arc<MarketDataGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl PriceSource for GatewayPriceSource {
    async fn current_price(&self, symbol: &Symbol) -> Result<f64> {
        let fetched = self.gateway.get_quote(symbol).await?;
        fetched
            .data
            .price
            .ok_or_else(|| MarketError::NotFound(format!("no price for {symbol}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotedesk_core::{MarketDataProvider, QuoteKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted provider: answers every kind from fixed fields and counts
    /// calls per kind.
    #[derive(Debug, Default)]
    struct ScriptedProvider {
        label: &'static str,
        price: Option<f64>,
        bars: Vec<HistoricalBar>,
        fail_with: Option<&'static str>,
        quote_calls: AtomicUsize,
        historical_calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn quoting(label: &'static str, price: f64) -> Self {
            Self {
                label,
                price: Some(price),
                ..Default::default()
            }
        }

        fn failing(label: &'static str) -> Self {
            Self {
                label,
                fail_with: Some("scripted failure"),
                ..Default::default()
            }
        }

        fn check_failure(&self) -> Result<()> {
            if let Some(msg) = self.fail_with {
                return Err(MarketError::Network(msg.to_string()));
            }
            Ok(())
        }
    }

    impl MarketDataProvider for ScriptedProvider {
        fn name(&self) -> &str {
            self.label
        }
    }

    #[async_trait]
    impl QuoteProvider for ScriptedProvider {
        async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote> {
            self.quote_calls.fetch_add(1, Ordering::SeqCst);
            self.check_failure()?;
            Ok(Quote {
                symbol: symbol.clone(),
                price: self.price,
                ..Default::default()
            })
        }
    }

    #[async_trait]
    impl HistoricalProvider for ScriptedProvider {
        async fn fetch_historical(
            &self,
            _symbol: &Symbol,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> Result<Vec<HistoricalBar>> {
            self.historical_calls.fetch_add(1, Ordering::SeqCst);
            self.check_failure()?;
            Ok(self.bars.clone())
        }
    }

    #[async_trait]
    impl FundamentalsProvider for ScriptedProvider {
        async fn fetch_financials(&self, _symbol: &Symbol) -> Result<FinancialReport> {
            self.check_failure()?;
            Ok(FinancialReport::default())
        }
    }

    #[async_trait]
    impl EtfProvider for ScriptedProvider {
        async fn fetch_etf_profile(&self, _symbol: &Symbol) -> Result<EtfProfile> {
            self.check_failure()?;
            Ok(EtfProfile::default())
        }
    }

    #[async_trait]
    impl SymbolSearchProvider for ScriptedProvider {
        async fn search(&self, query: &str) -> Result<Vec<SymbolMatch>> {
            self.check_failure()?;
            Ok(vec![SymbolMatch {
                symbol: Symbol::new(query),
                name: Some(format!("{} from {}", query, self.label)),
                exchange: None,
                kind: Some(QuoteKind::Equity),
            }])
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn bar(d: u32) -> HistoricalBar {
        HistoricalBar {
            date: day(d),
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
            volume: 1,
        }
    }

    #[tokio::test]
    async fn second_quote_within_ttl_is_a_cache_hit() {
        let primary = Arc::new(ScriptedProvider::quoting("primary", 100.0));
        let secondary = Arc::new(ScriptedProvider::quoting("secondary", 99.0));
        let gateway = MarketDataGateway::new(Some(primary.clone()), secondary);
        let symbol = Symbol::new("AAPL");

        let first = gateway.get_quote(&symbol).await.unwrap();
        let second = gateway.get_quote(&symbol).await.unwrap();

        assert_eq!(primary.quote_calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.origin, FetchOrigin::Primary);
        assert_eq!(second.origin, FetchOrigin::Cache);
        assert_eq!(second.fetched_at, first.fetched_at);
        assert_eq!(second.data.price, Some(100.0));
    }

    #[tokio::test]
    async fn expired_entry_triggers_a_fresh_fetch() {
        let primary = Arc::new(ScriptedProvider::quoting("primary", 100.0));
        let secondary = Arc::new(ScriptedProvider::quoting("secondary", 99.0));
        let gateway = MarketDataGateway::with_ttl(
            Some(primary.clone()),
            secondary,
            Duration::from_millis(20),
        );
        let symbol = Symbol::new("AAPL");

        gateway.get_quote(&symbol).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        let second = gateway.get_quote(&symbol).await.unwrap();

        assert_eq!(primary.quote_calls.load(Ordering::SeqCst), 2);
        assert_eq!(second.origin, FetchOrigin::Primary);
    }

    #[tokio::test]
    async fn primary_error_falls_back_to_secondary() {
        let primary = Arc::new(ScriptedProvider::failing("primary"));
        let secondary = Arc::new(ScriptedProvider::quoting("secondary", 99.0));
        let gateway = MarketDataGateway::new(Some(primary), secondary);

        let fetched = gateway.get_quote(&Symbol::new("AAPL")).await.unwrap();

        assert_eq!(fetched.origin, FetchOrigin::Secondary);
        assert_eq!(fetched.data.price, Some(99.0));
        assert_eq!(fetched.primary_error.unwrap().kind(), "Network");
    }

    #[tokio::test]
    async fn empty_primary_result_counts_as_failure() {
        let primary = Arc::new(ScriptedProvider {
            label: "primary",
            bars: Vec::new(),
            ..Default::default()
        });
        let secondary = Arc::new(ScriptedProvider {
            label: "secondary",
            bars: vec![bar(1), bar(2)],
            ..Default::default()
        });
        let gateway = MarketDataGateway::new(Some(primary.clone()), secondary.clone());

        let fetched = gateway
            .get_historical(&Symbol::new("AAPL"), day(1), day(31))
            .await
            .unwrap();

        assert_eq!(primary.historical_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary.historical_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fetched.origin, FetchOrigin::Secondary);
        assert_eq!(fetched.data.len(), 2);
        assert_eq!(fetched.primary_error.unwrap().kind(), "NotFound");
    }

    #[tokio::test]
    async fn both_failing_surfaces_the_secondary_error() {
        let primary = Arc::new(ScriptedProvider::failing("primary"));
        let secondary = Arc::new(ScriptedProvider {
            label: "secondary",
            fail_with: Some("secondary down"),
            ..Default::default()
        });
        let gateway = MarketDataGateway::new(Some(primary), secondary);

        let err = gateway.get_quote(&Symbol::new("AAPL")).await.unwrap_err();
        assert!(err.to_string().contains("secondary down"));
    }

    #[tokio::test]
    async fn without_primary_the_secondary_answers_directly() {
        let secondary = Arc::new(ScriptedProvider::quoting("secondary", 50.0));
        let gateway = MarketDataGateway::new(None, secondary.clone());

        let fetched = gateway.get_quote(&Symbol::new("AAPL")).await.unwrap();

        assert_eq!(fetched.origin, FetchOrigin::Secondary);
        assert!(fetched.primary_error.is_none());
        assert_eq!(secondary.quote_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_symbol_is_rejected_before_any_provider_call() {
        let primary = Arc::new(ScriptedProvider::quoting("primary", 1.0));
        let gateway = MarketDataGateway::new(
            Some(primary.clone()),
            Arc::new(ScriptedProvider::quoting("secondary", 1.0)),
        );

        let err = gateway.get_quote(&Symbol::new("   ")).await.unwrap_err();

        assert_eq!(err.kind(), "InvalidInput");
        assert_eq!(primary.quote_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn historical_ranges_cache_independently() {
        let secondary = Arc::new(ScriptedProvider {
            label: "secondary",
            bars: vec![bar(1)],
            ..Default::default()
        });
        let gateway = MarketDataGateway::new(None, secondary.clone());
        let symbol = Symbol::new("AAPL");

        gateway.get_historical(&symbol, day(1), day(10)).await.unwrap();
        gateway.get_historical(&symbol, day(1), day(20)).await.unwrap();
        gateway.get_historical(&symbol, day(1), day(10)).await.unwrap();

        // Two distinct ranges, one repeat served from cache.
        assert_eq!(secondary.historical_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn search_is_not_cached() {
        let secondary = Arc::new(ScriptedProvider::quoting("secondary", 1.0));
        let gateway = MarketDataGateway::new(None, secondary);

        let first = gateway.search("apple").await.unwrap();
        assert_eq!(first[0].symbol.as_str(), "APPLE");
        assert!(gateway.search("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn price_source_unwraps_quote_price() {
        let secondary = Arc::new(ScriptedProvider::quoting("secondary", 123.0));
        let gateway = Arc::new(MarketDataGateway::new(None, secondary));
        let source = GatewayPriceSource::new(gateway);

        let price = source.current_price(&Symbol::new("AAPL")).await.unwrap();
        assert_eq!(price, 123.0);
    }

    #[tokio::test]
    async fn price_source_reports_missing_price_as_not_found() {
        let secondary = Arc::new(ScriptedProvider {
            label: "secondary",
            price: None,
            ..Default::default()
        });
        let gateway = Arc::new(MarketDataGateway::new(None, secondary));
        let source = GatewayPriceSource::new(gateway);

        let err = source
            .current_price(&Symbol::new("AAPL"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "NotFound");
    }
}
