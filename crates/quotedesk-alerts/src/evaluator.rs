//! Interval evaluation of price alerts.
//!
//! Per alert the state machine is `Active -> Triggered -> deleted`; there
//! is no paused or expired state. Notification and deletion are two
//! independent side effects of the same transition: a notification failure
//! is logged and never blocks the deletion write.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use quotedesk_core::{Result, Symbol};
use tracing::{debug, warn};

use crate::store::{AlertCondition, AlertStore, PriceAlert};

/// Wall-clock interval between evaluation cycles.
pub const EVALUATION_INTERVAL: Duration = Duration::from_secs(60);

/// Source of current prices, implemented by the market-data gateway.
#[async_trait]
pub trait PriceSource: Send + Sync + Debug {
    /// Returns the current price for a symbol.
    async fn current_price(&self, symbol: &Symbol) -> Result<f64>;
}

/// External collaborator that delivers a triggered-alert notification.
#[async_trait]
pub trait Notifier: Send + Sync + Debug {
    /// Notifies the user that `alert` triggered at `price`.
    async fn notify(&self, alert: &PriceAlert, price: f64) -> Result<()>;
}

/// Returns true if an alert fires at the given price. Boundaries are
/// inclusive: an exact match always fires.
#[must_use]
pub fn is_triggered(condition: AlertCondition, current: f64, target: f64) -> bool {
    match condition {
        AlertCondition::Above => current >= target,
        AlertCondition::Below => current <= target,
    }
}

/// Polls stored alerts on a fixed interval and fires the ones that hit.
#[derive(Debug)]
pub struct AlertEvaluator {
    store: Arc<AlertStore>,
    prices: Arc<dyn PriceSource>,
    notifier: Arc<dyn Notifier>,
}

impl AlertEvaluator {
    /// Creates an evaluator over a store, a price source, and a notifier.
    #[must_use]
    pub fn new(
        store: Arc<AlertStore>,
        prices: Arc<dyn PriceSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            prices,
            notifier,
        }
    }

    /// Runs evaluation cycles forever at the given interval.
    ///
    /// Intended to be spawned once for the life of the process. No cycle
    /// failure terminates the loop.
    pub async fn run(self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.evaluate_cycle().await;
        }
    }

    /// Evaluates all alerts once and returns how many triggered.
    ///
    /// Alerts are grouped by symbol so several alerts on one symbol cost a
    /// single price fetch. A failed fetch skips that symbol's alerts for
    /// this cycle without touching them. The store is rewritten only when
    /// at least one alert triggered.
    pub async fn evaluate_cycle(&self) -> usize {
        let alerts = match self.store.list().await {
            Ok(alerts) => alerts,
            Err(e) => {
                warn!(error = %e, "could not load alerts, skipping cycle");
                return 0;
            }
        };
        if alerts.is_empty() {
            return 0;
        }

        let mut by_symbol: HashMap<Symbol, Vec<&PriceAlert>> = HashMap::new();
        for alert in &alerts {
            by_symbol.entry(alert.symbol.clone()).or_default().push(alert);
        }

        let mut triggered_ids: Vec<String> = Vec::new();
        for (symbol, group) in by_symbol {
            let price = match self.prices.current_price(&symbol).await {
                Ok(price) => price,
                Err(e) => {
                    // Transient fetch failure must never lose an alert.
                    warn!(%symbol, error = %e, "price fetch failed, skipping symbol");
                    continue;
                }
            };

            for alert in group {
                if is_triggered(alert.condition, price, alert.target_price) {
                    debug!(id = %alert.id, %symbol, price, target = alert.target_price, "alert triggered");
                    if let Err(e) = self.notifier.notify(alert, price).await {
                        warn!(id = %alert.id, error = %e, "notification failed");
                    }
                    triggered_ids.push(alert.id.clone());
                }
            }
        }

        if !triggered_ids.is_empty() {
            if let Err(e) = self.store.remove_ids(&triggered_ids).await {
                warn!(error = %e, "failed to remove triggered alerts");
            }
        }
        triggered_ids.len()
    }
}
