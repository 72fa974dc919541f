//! # kabuscore Core
//!
//! Rating engine and retrieval contracts for single-security attractiveness
//! scoring.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`rating`] | Pure scoring of ratios into score, tier and factors |
//! | [`domain`] | Stock code, financial record, ratio derivation |
//! | [`data_source`] | Retrieval trait, requests and error taxonomy |
//! | [`adapters`] | HTTP stock API and fixture adapters |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`circuit_breaker`] | Circuit breaker for upstream calls |
//! | [`retry`] | Retry and backoff policy |
//! | [`config`] | Layered client configuration |
//! | [`envelope`] | Response envelope with metadata |
//! | [`error`] | Core error types |
//! | [`source`] | Source identifiers |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / User     │
//! └────────┬────────┘
//!          │ StockCode
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ StockSource     │────▶│ Circuit Breaker  │
//! │ (adapter trait) │     │ + Retry          │
//! └────────┬────────┘     └──────────────────┘
//!          │                       │
//!          │              ┌──────────────────┐
//!          │              │ HTTP Client      │
//!          │              └──────────────────┘
//!          ▼ FinancialRecord
//! ┌─────────────────┐
//! │ Rating Engine   │  pure, no I/O
//! └────────┬────────┘
//!          ▼ RatingResult
//! ┌─────────────────┐
//! │ Presentation    │
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! The rating engine is total and never fails. Retrieval returns structured
//! errors:
//!
//! ```rust
//! use kabuscore_core::{SourceError, SourceErrorKind};
//!
//! fn handle_error(error: SourceError) {
//!     match error.kind() {
//!         SourceErrorKind::InvalidCode => {
//!             // Ask the user for a 4-digit code
//!         }
//!         SourceErrorKind::Unavailable => {
//!             // Retry later
//!         }
//!         _ => {}
//!     }
//! }
//! ```

pub mod adapters;
pub mod circuit_breaker;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod rating;
pub mod retry;
pub mod source;

// Adapter implementations
pub use adapters::{FixtureStockAdapter, HttpStockAdapter};

// Circuit breaker
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};

// Configuration
pub use config::{ClientConfig, ConfigError};

// Retrieval trait and types
pub use data_source::{
    HealthState, HealthStatus, RecordRequest, SourceError, SourceErrorKind, StockSource,
};

// Domain models
pub use domain::{
    round2, CompanyProfile, FinancialRecord, PriceHistory, Ratios, RawFundamentals, StockCode,
    UtcDateTime,
};

// Envelope types
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta};

// Error types
pub use error::ValidationError;

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient,
};

// Rating engine
pub use rating::{
    classify_tier, evaluate, evaluate_ratios, evaluate_with, Contribution, Factor, Metric,
    RatingResult, Scorecard, Tier, MAX_SCORE,
};

// Retry logic
pub use retry::{Backoff, RetryConfig};

// Source identifiers
pub use source::SourceId;
