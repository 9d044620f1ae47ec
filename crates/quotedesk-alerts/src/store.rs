//! Persisted price-alert list.
//!
//! All alerts live in one on-disk JSON list owned exclusively by this
//! store; no other component holds a competing copy.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use quotedesk_core::{MarketError, Result, Symbol};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Trigger condition of a price alert. Both comparisons are inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCondition {
    /// Fires when the current price is at or above the target.
    Above,
    /// Fires when the current price is at or below the target.
    Below,
}

/// One price alert. Lifecycle: created by the user, optionally edited,
/// deleted either explicitly or automatically once triggered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceAlert {
    /// Opaque id generated at creation.
    pub id: String,
    /// Symbol the alert watches.
    pub symbol: Symbol,
    /// Trigger condition.
    pub condition: AlertCondition,
    /// Target price, strictly positive.
    pub target_price: f64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Fields for creating an alert.
#[derive(Clone, Debug, Deserialize)]
pub struct NewAlert {
    /// Symbol to watch.
    pub symbol: Symbol,
    /// Trigger condition.
    pub condition: AlertCondition,
    /// Target price, strictly positive.
    pub target_price: f64,
}

/// Fields for editing an alert; `None` leaves a field unchanged.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AlertUpdate {
    /// New trigger condition.
    pub condition: Option<AlertCondition>,
    /// New target price, strictly positive.
    pub target_price: Option<f64>,
}

/// On-disk store for the alert list.
///
/// Reads and writes are serialized through an internal lock so a CRUD call
/// and an evaluator sweep never interleave a read-modify-write.
#[derive(Debug)]
pub struct AlertStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AlertStore {
    /// Creates a store backed by `data_dir/alerts.json`.
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("alerts.json"),
            lock: Mutex::new(()),
        }
    }

    /// Lists all alerts. A missing file is an empty list.
    pub async fn list(&self) -> Result<Vec<PriceAlert>> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Creates a new alert and persists the list.
    pub async fn create(&self, new: NewAlert) -> Result<PriceAlert> {
        if new.symbol.is_empty() {
            return Err(MarketError::InvalidInput("empty alert symbol".into()));
        }
        validate_target(new.target_price)?;

        let alert = PriceAlert {
            id: Uuid::new_v4().to_string(),
            symbol: new.symbol,
            condition: new.condition,
            target_price: new.target_price,
            created_at: Utc::now(),
        };

        let _guard = self.lock.lock().await;
        let mut alerts = self.load().await?;
        alerts.push(alert.clone());
        self.save(&alerts).await?;
        debug!(id = %alert.id, symbol = %alert.symbol, "created alert");
        Ok(alert)
    }

    /// Edits an existing alert's condition and/or target price.
    pub async fn update(&self, id: &str, update: AlertUpdate) -> Result<PriceAlert> {
        if let Some(target) = update.target_price {
            validate_target(target)?;
        }

        let _guard = self.lock.lock().await;
        let mut alerts = self.load().await?;
        let alert = alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| MarketError::NotFound(format!("alert {id}")))?;

        if let Some(condition) = update.condition {
            alert.condition = condition;
        }
        if let Some(target) = update.target_price {
            alert.target_price = target;
        }
        let updated = alert.clone();
        self.save(&alerts).await?;
        Ok(updated)
    }

    /// Deletes an alert by id.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut alerts = self.load().await?;
        let before = alerts.len();
        alerts.retain(|a| a.id != id);
        if alerts.len() == before {
            return Err(MarketError::NotFound(format!("alert {id}")));
        }
        self.save(&alerts).await
    }

    /// Removes a set of alerts in one read-modify-write.
    ///
    /// Used by the evaluator so the list is rewritten at most once per
    /// cycle. Ids that no longer exist are ignored.
    pub async fn remove_ids(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let _guard = self.lock.lock().await;
        let mut alerts = self.load().await?;
        alerts.retain(|a| !ids.contains(&a.id));
        self.save(&alerts).await
    }

    async fn load(&self) -> Result<Vec<PriceAlert>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(MarketError::Store(e.to_string())),
        };
        serde_json::from_slice(&raw).map_err(|e| MarketError::Store(e.to_string()))
    }

    async fn save(&self, alerts: &[PriceAlert]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| MarketError::Store(e.to_string()))?;
        }
        let raw =
            serde_json::to_vec_pretty(alerts).map_err(|e| MarketError::Store(e.to_string()))?;
        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|e| MarketError::Store(e.to_string()))
    }
}

fn validate_target(target: f64) -> Result<()> {
    if !target.is_finite() || target <= 0.0 {
        return Err(MarketError::InvalidInput(format!(
            "target price must be greater than 0, got {target}"
        )));
    }
    Ok(())
}
