//! Throttled HTTP client for the SEC's rate-limited hosts.
//!
//! The SEC asks automated clients to identify themselves and keep request
//! rates modest. This client enforces a minimum spacing between outbound
//! requests globally across all callers, retries 429/503 with exponential
//! backoff, and follows redirects manually so the spacing rule applies to
//! every wire request.

use std::sync::Arc;
use std::time::Duration;

use quotedesk_core::{MarketError, Result};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

/// Minimum spacing between outbound requests.
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(150);

/// Maximum retries after a 429/503 response.
pub const MAX_RETRIES: u32 = 3;

/// First backoff delay; doubles on each further retry (1 s, 2 s, 4 s).
pub const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Redirect hops followed before giving up.
const MAX_REDIRECTS: u32 = 5;

/// Configuration for [`RateLimitedHttpClient`].
///
/// Defaults match the SEC constants above; tests shrink the intervals.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Identifying header: application name/version plus operator contact.
    pub user_agent: String,
    /// Minimum wall-clock gap between consecutive outbound requests.
    pub min_interval: Duration,
    /// Retries allowed after a 429/503 before failing as rate-limited.
    pub max_retries: u32,
    /// First retry delay; doubles per attempt.
    pub backoff_base: Duration,
}

impl ClientConfig {
    /// Creates a config with SEC-appropriate defaults for a user agent.
    #[must_use]
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            min_interval: MIN_REQUEST_INTERVAL,
            max_retries: MAX_RETRIES,
            backoff_base: RETRY_BACKOFF,
        }
    }
}

/// Owned throttle state: the timestamp of the last dispatched request.
///
/// Process-wide by construction — every caller of the client shares one
/// instance behind a handle, so the spacing rule is per-host, not
/// per-caller.
#[derive(Debug)]
struct RequestThrottle {
    last_request: Option<Instant>,
    min_interval: Duration,
}

impl RequestThrottle {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: None,
            min_interval,
        }
    }

    /// Suspends the caller until the minimum spacing has passed, then
    /// claims the current instant as the dispatch time.
    async fn wait(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let delay = self.min_interval - elapsed;
                debug!(delay_ms = delay.as_millis() as u64, "throttling request");
                sleep(delay).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

/// HTTP GET client with global request spacing and 429/503 backoff.
#[derive(Debug, Clone)]
pub struct RateLimitedHttpClient {
    http: reqwest::Client,
    throttle: Arc<Mutex<RequestThrottle>>,
    config: ClientConfig,
}

impl RateLimitedHttpClient {
    /// Creates a client from a config.
    ///
    /// Redirect following is disabled on the inner client; redirects are
    /// handled by [`Self::fetch`] so the throttle covers every hop.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            http,
            throttle: Arc::new(Mutex::new(RequestThrottle::new(config.min_interval))),
            config,
        }
    }

    /// Performs a GET request and decodes the body as JSON.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.fetch(url, true).await?;
        let url = response.url().to_string();
        let text = response
            .text()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;
        serde_json::from_str(&text)
            .map_err(|e| MarketError::Decode(format!("{url}: {e}")))
    }

    /// Performs a GET request and returns the raw body bytes.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.fetch(url, false).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// Single GET with throttling, manual redirects, and 429/503 retries.
    ///
    /// A redirect hop goes back through the throttle but does not count as
    /// a retry. Any non-2xx other than 429/503 fails immediately.
    async fn fetch(&self, url: &str, accept_json: bool) -> Result<reqwest::Response> {
        let mut url = url.to_string();
        let mut attempt: u32 = 0;
        let mut redirects: u32 = 0;

        loop {
            self.throttle.lock().await.wait().await;

            let mut request = self.http.get(&url);
            if accept_json {
                request = request.header(reqwest::header::ACCEPT, "application/json");
            }

            let response = request
                .send()
                .await
                .map_err(|e| MarketError::Network(e.to_string()))?;
            let status = response.status();

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(reqwest::header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                if let Some(location) = location {
                    redirects += 1;
                    if redirects > MAX_REDIRECTS {
                        return Err(MarketError::Http {
                            status: status.as_u16(),
                            url,
                        });
                    }
                    let next = response
                        .url()
                        .join(&location)
                        .map_err(|e| MarketError::Decode(format!("bad redirect target: {e}")))?;
                    debug!(from = %url, to = %next, "following redirect");
                    url = next.to_string();
                    continue;
                }
                return Err(MarketError::Http {
                    status: status.as_u16(),
                    url,
                });
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS
                || status == reqwest::StatusCode::SERVICE_UNAVAILABLE
            {
                if attempt < self.config.max_retries {
                    let delay = self.config.backoff_base * 2u32.pow(attempt);
                    warn!(
                        %url,
                        status = status.as_u16(),
                        delay_ms = delay.as_millis() as u64,
                        "rate limited, backing off"
                    );
                    sleep(delay).await;
                    attempt += 1;
                    continue;
                }
                let host = response
                    .url()
                    .host_str()
                    .unwrap_or("unknown")
                    .to_string();
                return Err(MarketError::RateLimited {
                    host,
                    attempts: attempt + 1,
                });
            }

            if !status.is_success() {
                return Err(MarketError::Http {
                    status: status.as_u16(),
                    url,
                });
            }

            return Ok(response);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(min_interval: Duration, backoff: Duration) -> ClientConfig {
        ClientConfig {
            user_agent: "quotedesk-tests/0.1 (dev@quotedesk.invalid)".to_string(),
            min_interval,
            max_retries: MAX_RETRIES,
            backoff_base: backoff,
        }
    }

    #[tokio::test]
    async fn consecutive_requests_respect_minimum_spacing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/spaced"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(3)
            .mount(&server)
            .await;

        let client = RateLimitedHttpClient::new(test_config(
            Duration::from_millis(150),
            Duration::from_millis(1),
        ));
        let url = format!("{}/spaced", server.uri());

        let started = std::time::Instant::now();
        for _ in 0..3 {
            let _: Value = client.fetch_json(&url).await.unwrap();
        }
        // Three dispatches means two enforced gaps of >= 150 ms.
        assert!(started.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn rate_limit_is_retried_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let client = RateLimitedHttpClient::new(test_config(
            Duration::from_millis(1),
            Duration::from_millis(10),
        ));
        let url = format!("{}/flaky", server.uri());

        let value: Value = client.fetch_json(&url).await.unwrap();
        assert_eq!(value["ok"], 1);
    }

    #[tokio::test]
    async fn exhausted_retries_fail_as_rate_limited_with_growing_backoff() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/limited"))
            .respond_with(ResponseTemplate::new(503))
            .expect(4) // initial attempt + 3 retries
            .mount(&server)
            .await;

        let base = Duration::from_millis(20);
        let client =
            RateLimitedHttpClient::new(test_config(Duration::from_millis(1), base));
        let url = format!("{}/limited", server.uri());

        let started = std::time::Instant::now();
        let err = client.fetch_json::<Value>(&url).await.unwrap_err();
        // Backoff schedule is base, 2*base, 4*base.
        assert!(started.elapsed() >= base * 7);
        match err {
            MarketError::RateLimited { attempts, .. } => assert_eq!(attempts, 4),
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn not_found_is_never_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = RateLimitedHttpClient::new(test_config(
            Duration::from_millis(1),
            Duration::from_millis(1),
        ));
        let url = format!("{}/missing", server.uri());

        let err = client.fetch_json::<Value>(&url).await.unwrap_err();
        match err {
            MarketError::Http { status, .. } => assert_eq!(status, 404),
            other => panic!("expected Http, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn redirects_are_followed_transparently() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/new"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"moved": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = RateLimitedHttpClient::new(test_config(
            Duration::from_millis(1),
            Duration::from_millis(1),
        ));
        let url = format!("{}/old", server.uri());

        let value: Value = client.fetch_json(&url).await.unwrap();
        assert_eq!(value["moved"], true);
    }

    #[tokio::test]
    async fn malformed_json_fails_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/garbage"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
            .expect(1)
            .mount(&server)
            .await;

        let client = RateLimitedHttpClient::new(test_config(
            Duration::from_millis(1),
            Duration::from_millis(1),
        ));
        let url = format!("{}/garbage", server.uri());

        let err = client.fetch_json::<Value>(&url).await.unwrap_err();
        assert!(matches!(err, MarketError::Decode(_)));
    }
}
