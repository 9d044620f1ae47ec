//! Canonical data types for the market-data layer.
//!
//! These are the only shapes that leave the gateway, regardless of which
//! provider answered:
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`Quote`] - Snapshot quote with optional valuation fields
//! - [`HistoricalBar`] - One calendar-day OHLCV bar
//! - [`FinancialPeriod`] / [`FinancialReport`] - Financial statement data
//! - [`EtfProfile`] - Expense ratio and top holdings
//! - [`SymbolMatch`] - One row of a symbol search result

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A trading symbol/ticker.
///
/// Symbols are trimmed and uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, trimming and uppercasing.
    #[must_use]
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(s.as_ref().trim().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the symbol is empty after normalization.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Whether a quoted instrument is a single equity or an ETF.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteKind {
    /// A common stock.
    #[default]
    Equity,
    /// An exchange-traded fund.
    Etf,
}

/// A snapshot quote.
///
/// Every numeric field is optional because providers disagree on
/// availability; the gateway forwards whatever the answering provider had.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Display name of the instrument.
    pub name: Option<String>,
    /// Equity or ETF.
    pub kind: QuoteKind,
    /// Last traded price.
    pub price: Option<f64>,
    /// Previous session close.
    pub previous_close: Option<f64>,
    /// Absolute price change versus the previous close.
    pub change: Option<f64>,
    /// Percent price change versus the previous close.
    pub change_percent: Option<f64>,
    /// Market capitalization.
    pub market_cap: Option<f64>,
    /// Trading volume.
    pub volume: Option<f64>,
    /// Intraday high.
    pub day_high: Option<f64>,
    /// Intraday low.
    pub day_low: Option<f64>,
    /// 52-week high.
    pub week52_high: Option<f64>,
    /// 52-week low.
    pub week52_low: Option<f64>,
    /// Trailing price/earnings ratio.
    pub trailing_pe: Option<f64>,
    /// Forward price/earnings ratio.
    pub forward_pe: Option<f64>,
    /// Price-to-book ratio.
    pub price_to_book: Option<f64>,
    /// Price-to-sales ratio.
    pub price_to_sales: Option<f64>,
}

impl Quote {
    /// Creates an empty quote for a symbol.
    #[must_use]
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            ..Default::default()
        }
    }

    /// Derives `change` and `change_percent` from `price` and
    /// `previous_close` when both are known.
    ///
    /// When either is missing, whatever the provider supplied directly is
    /// left untouched — the two computation paths never both run, so a
    /// provider-supplied change is never corrected twice.
    #[must_use]
    pub fn with_derived_change(mut self) -> Self {
        if let (Some(price), Some(prev)) = (self.price, self.previous_close) {
            let change = price - prev;
            self.change = Some(change);
            self.change_percent = if prev != 0.0 {
                Some(change / prev * 100.0)
            } else {
                None
            };
        }
        self
    }
}

/// One calendar-day OHLCV bar.
///
/// Series returned by the gateway are ascending by date with no duplicate
/// dates per symbol within one range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoricalBar {
    /// Calendar day, no time component.
    pub date: NaiveDate,
    /// Opening price.
    pub open: f64,
    /// Highest price of the day.
    pub high: f64,
    /// Lowest price of the day.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Trading volume.
    pub volume: u64,
}

/// Sorts bars ascending by date and drops duplicate dates, keeping the
/// first occurrence.
#[must_use]
pub fn normalize_bars(mut bars: Vec<HistoricalBar>) -> Vec<HistoricalBar> {
    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);
    bars
}

/// One reported financial period.
///
/// Income-statement and balance-sheet fields share the struct; each list in
/// a [`FinancialReport`] populates its own side.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialPeriod {
    /// End date of the reporting period.
    pub period_end: NaiveDate,
    /// Total revenue.
    pub revenue: Option<f64>,
    /// Gross profit.
    pub gross_profit: Option<f64>,
    /// Operating income.
    pub operating_income: Option<f64>,
    /// Net income.
    pub net_income: Option<f64>,
    /// Total assets.
    pub total_assets: Option<f64>,
    /// Total liabilities.
    pub total_liabilities: Option<f64>,
    /// Total stockholders' equity.
    pub total_equity: Option<f64>,
}

/// Annual financial statements for one symbol.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialReport {
    /// Annual income statements, most recent first.
    pub income_annual: Vec<FinancialPeriod>,
    /// Annual balance sheets, most recent first.
    pub balance_annual: Vec<FinancialPeriod>,
}

impl FinancialReport {
    /// Returns true if neither statement list has any periods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.income_annual.is_empty() && self.balance_annual.is_empty()
    }
}

/// One position inside an ETF.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EtfHolding {
    /// Symbol of the held instrument.
    pub symbol: String,
    /// Name of the held instrument.
    pub name: Option<String>,
    /// Portfolio weight as a fraction (0–1).
    pub weight: Option<f64>,
}

/// ETF profile details.
///
/// Expense ratio and holding weights are always fractions (0–1); sources
/// with a percent convention are converted exactly once at the provider
/// boundary.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EtfProfile {
    /// Annual expense ratio as a fraction (e.g. 0.0003 for 0.03%).
    pub expense_ratio: Option<f64>,
    /// Largest holdings, heaviest first.
    pub top_holdings: Vec<EtfHolding>,
}

impl EtfProfile {
    /// Returns true if the profile carries no information at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expense_ratio.is_none() && self.top_holdings.is_empty()
    }
}

/// One row of a symbol search result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SymbolMatch {
    /// Matched symbol.
    pub symbol: Symbol,
    /// Display name.
    pub name: Option<String>,
    /// Exchange the instrument trades on, if known.
    pub exchange: Option<String>,
    /// Equity or ETF, if the source distinguishes.
    pub kind: Option<QuoteKind>,
}
