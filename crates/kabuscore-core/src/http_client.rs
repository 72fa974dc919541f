//! Transport seam for the stock API.
//!
//! Adapters talk to [`HttpClient`] so tests can script responses and
//! `--mock` runs can refuse the network outright.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A GET request against the stock API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    /// Lowercased header names.
    pub headers: BTreeMap<String, String>,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn accept_json(self) -> Self {
        self.with_header("accept", "application/json")
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }
}

/// Status and raw body of an answered request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok_json(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }

    /// The `error` field of a `{"error": "..."}` body, if the body has one.
    pub fn error_detail(&self) -> Option<String> {
        serde_json::from_str::<ErrorBody>(&self.body)
            .ok()
            .map(|body| body.error)
            .filter(|detail| !detail.trim().is_empty())
    }
}

/// The request never produced a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
    retryable: bool,
}

impl HttpError {
    /// A transient failure, worth another attempt.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    pub fn non_retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

impl From<reqwest::Error> for HttpError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_builder() {
            Self::non_retryable(format!("invalid request: {error}"))
        } else if error.is_timeout() {
            Self::new(format!("timed out: {error}"))
        } else if error.is_connect() {
            Self::new(format!("could not connect: {error}"))
        } else if error.is_body() || error.is_decode() {
            Self::new(format!("could not read body: {error}"))
        } else {
            Self::new(error.to_string())
        }
    }
}

pub type HttpFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;

pub trait HttpClient: Send + Sync {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a>;
}

/// Refuses every request. Backs offline runs.
#[derive(Debug, Default)]
pub struct NoopHttpClient;

impl HttpClient for NoopHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        let error = HttpError::non_retryable(format!("network disabled: GET {}", request.url));
        Box::pin(async move { Err(error) })
    }
}

/// reqwest-backed client used against the live stock API.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("kabuscore/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|error| {
                tracing::warn!(%error, "falling back to a default http client");
                reqwest::Client::new()
            });
        Self { client }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        Box::pin(async move {
            let builder = request.headers.iter().fold(
                self.client.get(&request.url).timeout(request.timeout),
                |builder, (name, value)| builder.header(name.as_str(), value.as_str()),
            );

            let response = builder.send().await.map_err(HttpError::from)?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(HttpError::from)?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_stored_lowercase() {
        let request = HttpRequest::get("http://localhost:5000/api/stock/7203")
            .with_header("X-Request-Id", "abc")
            .accept_json();

        assert_eq!(request.headers.get("x-request-id").map(String::as_str), Some("abc"));
        assert_eq!(
            request.headers.get("accept").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(request.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn success_covers_2xx_only() {
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }

    #[test]
    fn error_detail_reads_error_bodies() {
        let response = HttpResponse::new(400, r#"{"error":"Invalid stock code"}"#);
        assert_eq!(response.error_detail().as_deref(), Some("Invalid stock code"));
        assert_eq!(HttpResponse::new(500, "<html>").error_detail(), None);
        assert_eq!(HttpResponse::new(500, r#"{"error":" "}"#).error_detail(), None);
    }

    #[tokio::test]
    async fn noop_client_refuses_requests() {
        let error = NoopHttpClient
            .execute(HttpRequest::get("http://localhost/api/health"))
            .await
            .expect_err("noop must refuse");
        assert!(!error.retryable());
        assert_eq!(error.message(), "network disabled: GET http://localhost/api/health");
    }
}
