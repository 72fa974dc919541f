use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::circuit_breaker::CircuitBreaker;
use crate::config::ClientConfig;
use crate::data_source::{
    HealthState, HealthStatus, RecordRequest, SourceError, StockSource,
};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::retry::RetryConfig;
use crate::{
    CompanyProfile, FinancialRecord, Ratios, SourceId, StockCode, UtcDateTime,
};

/// Adapter for the JSON stock API (`GET {base_url}/api/stock/{code}`).
#[derive(Clone)]
pub struct HttpStockAdapter {
    base_url: String,
    timeout_ms: u64,
    http_client: Arc<dyn HttpClient>,
    circuit_breaker: Arc<CircuitBreaker>,
    retry: RetryConfig,
}

impl Default for HttpStockAdapter {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

impl HttpStockAdapter {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            timeout_ms: config.timeout_ms,
            http_client: Arc::new(ReqwestHttpClient::new()),
            circuit_breaker: Arc::new(CircuitBreaker::new(config.circuit_breaker_config())),
            retry: config.retry_config(),
        }
    }

    pub fn with_http_client(self, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            ..self
        }
    }

    pub fn with_circuit_breaker(self, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            circuit_breaker,
            ..self
        }
    }

    pub fn with_retry(self, retry: RetryConfig) -> Self {
        Self { retry, ..self }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn record_url(&self, code: &StockCode) -> String {
        format!("{}/api/stock/{}", self.base_url, code.as_str())
    }

    pub fn health_url(&self) -> String {
        format!("{}/api/health", self.base_url)
    }

    fn request(&self, url: &str) -> HttpRequest {
        HttpRequest::get(url)
            .accept_json()
            .with_timeout(Duration::from_millis(self.timeout_ms))
    }

    async fn fetch(&self, req: &RecordRequest) -> Result<FinancialRecord, SourceError> {
        let url = self.record_url(&req.code);
        let response = self.get_with_retry(&url).await?;

        let payload: StockPayload = serde_json::from_str(&response.body).map_err(|e| {
            SourceError::malformed_payload(format!("failed to parse stock api response: {e}"))
        })?;

        normalize_record(payload, &req.code)
    }

    async fn get_with_retry(&self, url: &str) -> Result<HttpResponse, SourceError> {
        let mut attempt = 0;
        let mut last_error: Option<SourceError> = None;
        loop {
            if !self.circuit_breaker.allow_request() {
                // Once a real answer is in hand, report it rather than the breaker.
                return Err(last_error.unwrap_or_else(|| {
                    SourceError::unavailable("stock api circuit breaker is open")
                }));
            }

            tracing::debug!(url, attempt, "requesting stock api");
            let error = match self.http_client.execute(self.request(url)).await {
                Ok(response) if response.is_success() => {
                    self.circuit_breaker.record_success();
                    return Ok(response);
                }
                Ok(response) => {
                    if is_server_fault(response.status) {
                        self.circuit_breaker.record_failure();
                    } else {
                        self.circuit_breaker.record_success();
                    }
                    let error = status_error(&response);
                    if !self.retry.should_retry_status(response.status) {
                        return Err(error);
                    }
                    error
                }
                Err(transport) => {
                    self.circuit_breaker.record_failure();
                    let error = SourceError::unavailable(format!(
                        "stock api transport error: {}",
                        transport.message()
                    ));
                    if !transport.retryable() {
                        return Err(error);
                    }
                    error
                }
            };

            if !self.retry.allows_retry(attempt) {
                tracing::warn!(%error, attempts = attempt + 1, "stock api request failed");
                return Err(error);
            }
            if self.circuit_breaker.is_rejecting() {
                tracing::warn!(%error, attempts = attempt + 1, "circuit opened, not retrying");
                return Err(error);
            }

            let delay = self.retry.delay_for_attempt(attempt);
            tracing::warn!(
                %error,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "retrying stock api request"
            );
            tokio::time::sleep(delay).await;
            last_error = Some(error);
            attempt += 1;
        }
    }

    async fn check_health(&self) -> HealthStatus {
        if self.circuit_breaker.is_rejecting() {
            return HealthStatus::unhealthy("stock api circuit breaker is open");
        }

        let response = match self.http_client.execute(self.request(&self.health_url())).await {
            Ok(response) => response,
            Err(error) => {
                return HealthStatus::unhealthy(format!(
                    "stock api transport error: {}",
                    error.message()
                ))
            }
        };

        if !response.is_success() {
            return HealthStatus::unhealthy(format!(
                "stock api health returned status {}",
                response.status
            ));
        }

        match serde_json::from_str::<HealthPayload>(&response.body) {
            Ok(payload) if payload.status.eq_ignore_ascii_case("ok") => {
                HealthStatus::new(HealthState::Healthy, payload.message)
            }
            Ok(payload) => HealthStatus::new(
                HealthState::Degraded,
                Some(format!("stock api reports status '{}'", payload.status)),
            ),
            Err(e) => HealthStatus::new(
                HealthState::Degraded,
                Some(format!("unparsable health response: {e}")),
            ),
        }
    }
}

impl StockSource for HttpStockAdapter {
    fn id(&self) -> SourceId {
        SourceId::StockApi
    }

    fn fetch_record<'a>(
        &'a self,
        req: RecordRequest,
    ) -> Pin<Box<dyn Future<Output = Result<FinancialRecord, SourceError>> + Send + 'a>> {
        Box::pin(async move { self.fetch(&req).await })
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        Box::pin(self.check_health())
    }
}

/// Wire shape of `GET /api/stock/{code}`.
#[derive(Debug, Deserialize)]
struct StockPayload {
    stock_code: Option<String>,
    name: Option<String>,
    price: Option<f64>,
    change: Option<f64>,
    change_percent: Option<f64>,
    volume: Option<u64>,
    market_cap: Option<f64>,
    per: Option<f64>,
    pbr: Option<f64>,
    roe: Option<f64>,
    dividend: Option<f64>,
    sector: Option<String>,
    industry: Option<String>,
    last_updated: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HealthPayload {
    status: String,
    message: Option<String>,
}

/// Statuses that count against the circuit breaker. Any other answer proves
/// the API reachable.
const fn is_server_fault(status: u16) -> bool {
    status >= 500 || status == 408 || status == 429
}

fn status_error(response: &HttpResponse) -> SourceError {
    let message = match response.error_detail() {
        Some(detail) => format!("stock api returned status {}: {detail}", response.status),
        None => format!("stock api returned status {}", response.status),
    };

    if response.status == 400 {
        SourceError::invalid_code(message)
    } else {
        SourceError::http_status(response.status, message)
    }
}

fn normalize_record(
    payload: StockPayload,
    requested: &StockCode,
) -> Result<FinancialRecord, SourceError> {
    if let Some(error) = payload.error {
        return Err(SourceError::unavailable(format!("stock api error: {error}")));
    }

    let raw_code = payload
        .stock_code
        .ok_or_else(|| SourceError::missing_field("stock_code"))?;
    let code = StockCode::parse(&raw_code).map_err(|e| {
        SourceError::malformed_payload(format!("response carries invalid code: {e}"))
    })?;
    if code != *requested {
        return Err(SourceError::malformed_payload(format!(
            "response code {code} does not match requested {requested}"
        )));
    }

    let price = payload.price.ok_or_else(|| SourceError::missing_field("price"))?;
    let change = payload
        .change
        .ok_or_else(|| SourceError::missing_field("change"))?;
    let change_percent = payload
        .change_percent
        .ok_or_else(|| SourceError::missing_field("change_percent"))?;
    let volume = payload
        .volume
        .ok_or_else(|| SourceError::missing_field("volume"))?;

    let last_updated = payload
        .last_updated
        .as_deref()
        .and_then(|raw| match UtcDateTime::parse_lenient(raw) {
            Ok(ts) => Some(ts),
            Err(error) => {
                tracing::warn!(%error, "ignoring unparsable last_updated");
                None
            }
        });

    let ratios = Ratios::new(payload.per, payload.pbr, payload.roe, payload.dividend)?;
    let profile = CompanyProfile {
        market_cap: payload.market_cap,
        sector: payload.sector,
        industry: payload.industry,
        last_updated,
    };

    let record = FinancialRecord::new(code, price, change, change_percent, volume)?
        .with_ratios(ratios)?
        .with_profile(profile)?;

    Ok(match payload.name.filter(|name| !name.trim().is_empty()) {
        Some(name) => record.with_name(name),
        None => record,
    })
}
