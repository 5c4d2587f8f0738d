// src/http/client.rs
use crate::utils::error::FetchError;
use reqwest::header::{self, HeaderMap};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Statuses worth another attempt. Everything else that isn't 200 fails at once.
const RETRYABLE_STATUSES: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// Fixed-count, fixed-delay retry settings shared by every request of a run.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per request (not additional retries).
    pub max_retries: u32,
    pub delay: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_millis(1500),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Body and content type of a 200 response, fully read.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// True when the server labelled the body as JSON rather than a file.
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false)
    }
}

enum Attempt {
    Done(HttpResponse),
    Retry(StatusCode),
}

/// GET-only HTTP client with bounded retry on transient failures.
pub struct Fetcher {
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(policy: RetryPolicy) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, policy })
    }

    /// Issues a GET, retrying timeouts, transport errors, 429 and 5xx up to
    /// `max_retries` attempts with a fixed delay between attempts.
    ///
    /// Any other non-200 status fails immediately. When attempts run out the
    /// last transport error is returned, or `RetriesExhausted` if every
    /// attempt got a retryable status.
    pub async fn fetch(
        &self,
        url: &str,
        query: &[(&str, String)],
        headers: Option<&HeaderMap>,
    ) -> Result<HttpResponse, FetchError> {
        let attempts = self.policy.max_retries.max(1);
        let mut last_error: Option<reqwest::Error> = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                tokio::time::sleep(self.policy.delay).await;
            }

            let mut request = self.client.get(url).timeout(self.policy.timeout);
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(headers) = headers {
                request = request.headers(headers.clone());
            }

            match self.send_once(request, url).await {
                Ok(Attempt::Done(response)) => {
                    tracing::debug!("GET {} -> {} bytes (attempt {})", url, response.body.len(), attempt);
                    return Ok(response);
                }
                Ok(Attempt::Retry(status)) => {
                    tracing::warn!("GET {} returned {} (attempt {}/{})", url, status, attempt, attempts);
                }
                Err(FetchError::Network(e)) => {
                    tracing::warn!("GET {} failed: {} (attempt {}/{})", url, e, attempt, attempts);
                    last_error = Some(e);
                }
                Err(other) => return Err(other),
            }
        }

        Err(match last_error {
            Some(e) => FetchError::Network(e),
            None => FetchError::RetriesExhausted { url: url.to_string(), attempts },
        })
    }

    async fn send_once(&self, request: reqwest::RequestBuilder, url: &str) -> Result<Attempt, FetchError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::OK {
            let content_type = response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response.bytes().await?.to_vec();
            return Ok(Attempt::Done(HttpResponse { content_type, body }));
        }
        if RETRYABLE_STATUSES.contains(&status) {
            return Ok(Attempt::Retry(status));
        }

        tracing::error!("HTTP error status: {} for URL: {}", status, url);
        Err(FetchError::Http { status, url: url.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio_test::{assert_err, assert_ok};

    fn quick_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            delay: Duration::from_millis(20),
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn retries_through_503_and_returns_success() {
        let mut server = mockito::Server::new_async().await;
        let unavailable = server
            .mock("GET", "/doc")
            .with_status(503)
            .expect(2)
            .create_async()
            .await;
        let ok = server
            .mock("GET", "/doc")
            .with_status(200)
            .with_body("payload")
            .expect(1)
            .create_async()
            .await;

        let delay = Duration::from_millis(100);
        let fetcher = Fetcher::new(RetryPolicy { delay, ..quick_policy(3) }).unwrap();
        let started = Instant::now();
        let response = assert_ok!(fetcher.fetch(&format!("{}/doc", server.url()), &[], None).await);
        let elapsed = started.elapsed();

        assert_eq!(response.text(), "payload");
        // Exactly two delays between three attempts: no leading or trailing sleep.
        assert!(elapsed >= delay * 2, "elapsed {:?}", elapsed);
        assert!(elapsed < delay * 3, "elapsed {:?}", elapsed);
        unavailable.assert_async().await;
        ok.assert_async().await;
    }

    #[tokio::test]
    async fn permanent_status_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let missing = server
            .mock("GET", "/gone")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let fetcher = Fetcher::new(quick_policy(3)).unwrap();
        let err = assert_err!(fetcher.fetch(&format!("{}/gone", server.url()), &[], None).await);

        assert!(matches!(err, FetchError::Http { status, .. } if status == StatusCode::NOT_FOUND));
        missing.assert_async().await;
    }

    #[tokio::test]
    async fn only_retryable_statuses_exhaust_to_generic_failure() {
        let mut server = mockito::Server::new_async().await;
        let throttled = server
            .mock("GET", "/busy")
            .with_status(429)
            .expect(2)
            .create_async()
            .await;

        let fetcher = Fetcher::new(quick_policy(2)).unwrap();
        let err = assert_err!(fetcher.fetch(&format!("{}/busy", server.url()), &[], None).await);

        assert!(matches!(err, FetchError::RetriesExhausted { attempts: 2, .. }));
        throttled.assert_async().await;
    }

    #[tokio::test]
    async fn transport_error_is_surfaced_after_retries() {
        let fetcher = Fetcher::new(quick_policy(2)).unwrap();
        // Port 1 is never listening in the test environment.
        let err = assert_err!(fetcher.fetch("http://127.0.0.1:1/nothing", &[], None).await);

        assert!(matches!(err, FetchError::Network(_)));
    }

    #[tokio::test]
    async fn sends_query_parameters() {
        let mut server = mockito::Server::new_async().await;
        let listing = server
            .mock("GET", "/list")
            .match_query(mockito::Matcher::UrlEncoded("date".into(), "2025-08-01".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let fetcher = Fetcher::new(quick_policy(1)).unwrap();
        let response = fetcher
            .fetch(&format!("{}/list", server.url()), &[("date", "2025-08-01".to_string())], None)
            .await
            .unwrap();

        assert!(response.is_json());
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["ok"], true);
        listing.assert_async().await;
    }
}
