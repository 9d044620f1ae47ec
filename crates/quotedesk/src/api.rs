//! UI-facing request/response surface.
//!
//! Every operation on [`App`] is infallible at the signature level: internal
//! failures become the `{ ok: false, error }` envelope, never an `Err` or a
//! panic. The `error.kind` strings come from [`MarketError::kind`] and are
//! part of the external contract.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use quotedesk_alerts::{
    AlertEvaluator, AlertStore, AlertUpdate, EVALUATION_INTERVAL, NewAlert, Notifier, PriceAlert,
};
use quotedesk_core::{
    EtfProfile, FinancialReport, HistoricalBar, MarketError, Quote, Symbol, SymbolMatch,
};
use quotedesk_edgar::{
    ClientConfig, Company, DocumentConverter, EdgarCompanyResolver, FilingDocumentLocator,
    FilingsCacheRecord, FilingsStore, RateLimitedHttpClient,
};
use quotedesk_fmp::FmpProvider;
use quotedesk_yahoo::YahooProvider;
use serde::Serialize;

use crate::config::AppConfig;
use crate::gateway::{Fetched, FullMarketProvider, GatewayPriceSource, MarketDataGateway};

/// Error body carried in a failed envelope.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Stable error kind name, e.g. `"RateLimited"`.
    pub kind: &'static str,
    /// Human-readable message.
    pub message: String,
}

/// The envelope every UI-facing operation returns.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// When the payload was fetched, for cache-aware operations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
    /// Failure details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            fetched_at: None,
            error: None,
        }
    }

    fn success_at(data: T, fetched_at: DateTime<Utc>) -> Self {
        Self {
            ok: true,
            data: Some(data),
            fetched_at: Some(fetched_at),
            error: None,
        }
    }

    fn failure(err: &MarketError) -> Self {
        Self {
            ok: false,
            data: None,
            fetched_at: None,
            error: Some(ApiError {
                kind: err.kind(),
                message: err.to_string(),
            }),
        }
    }

    fn from_result(result: quotedesk_core::Result<T>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::failure(&e),
        }
    }

    fn from_fetched(result: quotedesk_core::Result<Fetched<T>>) -> Self {
        match result {
            Ok(fetched) => Self::success_at(fetched.data, fetched.fetched_at),
            Err(e) => Self::failure(&e),
        }
    }
}

/// The application facade wiring the gateway, EDGAR services, and alerts
/// behind the envelope API.
#[derive(Debug)]
pub struct App {
    gateway: Arc<MarketDataGateway>,
    resolver: EdgarCompanyResolver,
    filings: FilingsStore,
    documents: FilingDocumentLocator,
    alerts: Arc<AlertStore>,
}

impl App {
    /// Builds the application from configuration.
    ///
    /// When no API key is configured the gateway runs without a primary
    /// provider and every market-data request goes to the secondary.
    #[must_use]
    pub fn new(config: &AppConfig, converter: Arc<dyn DocumentConverter>) -> Self {
        let primary: Option<Arc<dyn FullMarketProvider>> = config
            .fmp_api_key
            .as_ref()
            .map(|key| Arc::new(FmpProvider::new(key)) as Arc<dyn FullMarketProvider>);
        let secondary: Arc<dyn FullMarketProvider> = Arc::new(YahooProvider::new());
        let gateway = Arc::new(MarketDataGateway::new(primary, secondary));

        let client = Arc::new(RateLimitedHttpClient::new(ClientConfig::new(
            &config.user_agent,
        )));
        let resolver = EdgarCompanyResolver::new(client.clone(), &config.data_dir);
        let filings = FilingsStore::new(client.clone(), &config.data_dir);
        let documents = FilingDocumentLocator::new(client, converter, &config.data_dir);
        let alerts = Arc::new(AlertStore::new(&config.data_dir));

        Self {
            gateway,
            resolver,
            filings,
            documents,
            alerts,
        }
    }

    /// Handle to the market-data gateway.
    #[must_use]
    pub fn gateway(&self) -> Arc<MarketDataGateway> {
        self.gateway.clone()
    }

    /// Handle to the alert store.
    #[must_use]
    pub fn alert_store(&self) -> Arc<AlertStore> {
        self.alerts.clone()
    }

    /// Spawns the alert evaluation loop for the life of the process.
    pub fn spawn_alert_evaluator(&self, notifier: Arc<dyn Notifier>) -> tokio::task::JoinHandle<()> {
        let evaluator = AlertEvaluator::new(
            self.alerts.clone(),
            Arc::new(GatewayPriceSource::new(self.gateway.clone())),
            notifier,
        );
        tokio::spawn(evaluator.run(EVALUATION_INTERVAL))
    }

    /// Searches instruments by ticker or name.
    pub async fn search_symbol(&self, query: &str) -> ApiResponse<Vec<SymbolMatch>> {
        ApiResponse::from_result(self.gateway.search(query).await)
    }

    /// Fetches the current quote for a symbol.
    pub async fn get_quote(&self, symbol: &str) -> ApiResponse<Quote> {
        ApiResponse::from_fetched(self.gateway.get_quote(&Symbol::new(symbol)).await)
    }

    /// Fetches daily bars for a symbol between two dates, inclusive.
    pub async fn get_historical(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ApiResponse<Vec<HistoricalBar>> {
        ApiResponse::from_fetched(
            self.gateway
                .get_historical(&Symbol::new(symbol), from, to)
                .await,
        )
    }

    /// Fetches annual financial statements for a symbol.
    pub async fn get_financials(&self, symbol: &str) -> ApiResponse<FinancialReport> {
        ApiResponse::from_fetched(self.gateway.get_financials(&Symbol::new(symbol)).await)
    }

    /// Fetches ETF details for a symbol.
    pub async fn get_etf_details(&self, symbol: &str) -> ApiResponse<EtfProfile> {
        ApiResponse::from_fetched(self.gateway.get_etf_profile(&Symbol::new(symbol)).await)
    }

    /// Searches the SEC company directory by ticker or name.
    pub async fn search_edgar_company(&self, query: &str) -> ApiResponse<Vec<Company>> {
        ApiResponse::from_result(self.resolver.search(query).await)
    }

    /// Lists a company's filings, optionally filtered by form type.
    pub async fn list_filings(
        &self,
        cik: &str,
        forms: &[String],
        force_refresh: bool,
    ) -> ApiResponse<FilingsCacheRecord> {
        ApiResponse::from_result(self.filings.list_filings(cik, forms, force_refresh).await)
    }

    /// Downloads (or reuses) the best viewable artifact for a filing and
    /// returns its local path.
    pub async fn download_filing_document(
        &self,
        cik: &str,
        accession_number: &str,
        primary_document: Option<&str>,
    ) -> ApiResponse<PathBuf> {
        ApiResponse::from_result(
            self.documents
                .download_document(cik, accession_number, primary_document)
                .await,
        )
    }

    /// Lists all price alerts.
    pub async fn list_alerts(&self) -> ApiResponse<Vec<PriceAlert>> {
        ApiResponse::from_result(self.alerts.list().await)
    }

    /// Creates a price alert.
    pub async fn create_alert(&self, new: NewAlert) -> ApiResponse<PriceAlert> {
        ApiResponse::from_result(self.alerts.create(new).await)
    }

    /// Edits a price alert's condition and/or target price.
    pub async fn update_alert(&self, id: &str, update: AlertUpdate) -> ApiResponse<PriceAlert> {
        ApiResponse::from_result(self.alerts.update(id, update).await)
    }

    /// Deletes a price alert.
    pub async fn delete_alert(&self, id: &str) -> ApiResponse<()> {
        ApiResponse::from_result(self.alerts.delete(id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotedesk_alerts::AlertCondition;
    use quotedesk_core::Result;

    #[derive(Debug)]
    struct NoopConverter;

    #[async_trait::async_trait]
    impl DocumentConverter for NoopConverter {
        async fn convert_to_pdf(&self, _url: &str, _dest: &std::path::Path) -> Result<()> {
            Ok(())
        }
    }

    fn test_app(dir: &std::path::Path) -> App {
        let config = AppConfig::new("quotedesk/0.1 (test@example.com)", dir);
        App::new(&config, Arc::new(NoopConverter))
    }

    #[test]
    fn success_envelope_shape() {
        let response = ApiResponse::success(vec![1, 2, 3]);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["data"][2], 3);
        assert!(json.get("error").is_none());
        assert!(json.get("fetched_at").is_none());
    }

    #[test]
    fn failure_envelope_carries_kind_and_message() {
        let err = MarketError::RateLimited {
            host: "data.sec.gov".into(),
            attempts: 4,
        };
        let response = ApiResponse::<()>::failure(&err);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"]["kind"], "RateLimited");
        assert!(
            json["error"]["message"]
                .as_str()
                .unwrap()
                .contains("data.sec.gov")
        );
        assert!(json.get("data").is_none());
    }

    #[tokio::test]
    async fn alert_crud_round_trips_through_the_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path());

        let created = app
            .create_alert(NewAlert {
                symbol: Symbol::new("aapl"),
                condition: AlertCondition::Above,
                target_price: 200.0,
            })
            .await;
        assert!(created.ok);
        let id = created.data.unwrap().id;

        let listed = app.list_alerts().await;
        assert_eq!(listed.data.unwrap().len(), 1);

        let updated = app
            .update_alert(
                &id,
                AlertUpdate {
                    condition: Some(AlertCondition::Below),
                    target_price: None,
                },
            )
            .await;
        assert_eq!(updated.data.unwrap().condition, AlertCondition::Below);

        assert!(app.delete_alert(&id).await.ok);
        assert!(app.list_alerts().await.data.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_alert_becomes_an_error_envelope_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path());

        let response = app
            .create_alert(NewAlert {
                symbol: Symbol::new("   "),
                condition: AlertCondition::Above,
                target_price: 10.0,
            })
            .await;

        assert!(!response.ok);
        assert_eq!(response.error.unwrap().kind, "InvalidInput");
    }

    #[tokio::test]
    async fn bad_cik_surfaces_invalid_input_through_the_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path());

        let response = app.list_filings("not-a-cik", &[], false).await;
        assert!(!response.ok);
        assert_eq!(response.error.unwrap().kind, "InvalidInput");
    }
}
