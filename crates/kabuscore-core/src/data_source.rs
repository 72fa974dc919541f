//! Retrieval contract and error taxonomy.
//!
//! A [`StockSource`] turns a validated [`RecordRequest`] into a
//! [`FinancialRecord`]. Every fault on the way (bad code, transport failure,
//! non-2xx status, unparsable payload, missing required field) surfaces as a
//! [`SourceError`]; the rating engine never sees a partial record.
//!
//! ```rust,ignore
//! use kabuscore_core::{HttpStockAdapter, RecordRequest, StockSource};
//!
//! async fn lookup(adapter: &HttpStockAdapter) -> Result<(), kabuscore_core::SourceError> {
//!     let request = RecordRequest::parse("7203")?;
//!     let record = adapter.fetch_record(request).await?;
//!     println!("{}: {:.2}", record.code, record.price);
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{FinancialRecord, SourceId, StockCode, UtcDateTime, ValidationError};

/// Source health as reported by [`StockSource::health`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Runtime source health snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub state: HealthState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub checked_at: UtcDateTime,
}

impl HealthStatus {
    pub fn new(state: HealthState, message: Option<String>) -> Self {
        Self {
            state,
            message,
            checked_at: UtcDateTime::now(),
        }
    }

    pub fn healthy(message: impl Into<String>) -> Self {
        Self::new(HealthState::Healthy, Some(message.into()))
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::new(HealthState::Unhealthy, Some(message.into()))
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceErrorKind {
    InvalidCode,
    Unavailable,
    HttpStatus,
    MalformedPayload,
    MissingField,
}

/// Structured retrieval error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
    status: Option<u16>,
}

impl SourceError {
    pub fn invalid_code(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidCode,
            message: message.into(),
            retryable: false,
            status: None,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
            status: None,
        }
    }

    /// Non-2xx response. Server errors are retryable, client errors are not.
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::HttpStatus,
            message: message.into(),
            retryable: status >= 500,
            status: Some(status),
        }
    }

    pub fn malformed_payload(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::MalformedPayload,
            message: message.into(),
            retryable: false,
            status: None,
        }
    }

    pub fn missing_field(field: &'static str) -> Self {
        Self {
            kind: SourceErrorKind::MissingField,
            message: format!("response is missing required field '{field}'"),
            retryable: false,
            status: None,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::InvalidCode => "source.invalid_code",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::HttpStatus => "source.http_status",
            SourceErrorKind::MalformedPayload => "source.malformed_payload",
            SourceErrorKind::MissingField => "source.missing_field",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::InvalidStockCode { .. } => Self::invalid_code(error.to_string()),
            other => Self::malformed_payload(other.to_string()),
        }
    }
}

/// Request payload for a single-security lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRequest {
    pub code: StockCode,
}

impl RecordRequest {
    pub fn new(code: StockCode) -> Self {
        Self { code }
    }

    /// Validate raw user input into a request.
    pub fn parse(raw: &str) -> Result<Self, SourceError> {
        StockCode::parse(raw)
            .map(Self::new)
            .map_err(|_| SourceError::invalid_code("enter a valid 4-digit stock code"))
    }
}

/// Retrieval adapter contract.
///
/// Implementations must be `Send + Sync`; one adapter instance may serve
/// overlapping lookups. Lookups are neither coalesced nor cancelled.
pub trait StockSource: Send + Sync {
    fn id(&self) -> SourceId;

    /// Fetch the current record for the requested code.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the source is unreachable, answers with a
    /// non-2xx status, or returns a payload that cannot form a valid record.
    fn fetch_record<'a>(
        &'a self,
        req: RecordRequest,
    ) -> Pin<Box<dyn Future<Output = Result<FinancialRecord, SourceError>> + Send + 'a>>;

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>>;
}
