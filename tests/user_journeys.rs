//! Behavior-driven tests for user journeys
//!
//! These tests verify WHAT a user can accomplish: look up a security by its
//! code, get it rated, and receive a well-formed envelope, online or offline.

use std::io::Write;
use std::sync::Arc;

use kabuscore_core::{
    evaluate, ClientConfig, Envelope, EnvelopeError, EnvelopeMeta, FinancialRecord,
    FixtureStockAdapter, HttpClient, HttpError, HttpRequest, HttpResponse, HttpStockAdapter,
    Ratios, RecordRequest, RetryConfig, SourceId, StockCode, StockSource, Tier,
};

struct FixedHttpClient(HttpResponse);

impl HttpClient for FixedHttpClient {
    fn execute<'a>(
        &'a self,
        _request: HttpRequest,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>,
    > {
        let response = self.0.clone();
        Box::pin(async move { Ok(response) })
    }
}

// =============================================================================
// User Journey: Rate a Security
// =============================================================================

#[tokio::test]
async fn user_can_rate_a_security_served_by_the_stock_api() {
    // Given: A stock API that knows Toyota
    let body = r#"{"stock_code":"7203","name":"Toyota Motor Corporation","price":2500,
        "change":15,"change_percent":0.6,"volume":12500000,"per":8.0,"pbr":1.0,
        "roe":18.0,"dividend":3.5,"last_updated":"2024-03-15T14:30:05.123456"}"#;
    let adapter = HttpStockAdapter::default()
        .with_http_client(Arc::new(FixedHttpClient(HttpResponse::ok_json(body))));

    // When: They look up code 7203 and rate it
    let record = adapter
        .fetch_record(RecordRequest::parse(" 7203 ").expect("valid code"))
        .await
        .expect("lookup succeeds");
    let rating = evaluate(&record);

    // Then: They see the best tier with all four strengths listed
    assert_eq!(rating.score, 80);
    assert_eq!(rating.tier, Tier::VeryAttractive);
    assert_eq!(
        rating.label(),
        "Very attractive (low-PER, fair-PBR, high-ROE, high-dividend)"
    );
}

#[tokio::test]
async fn user_rating_a_loss_making_company_gets_no_credit_for_negative_ratios() {
    // Given: A company with negative earnings and no dividend
    let record = FinancialRecord::new(
        StockCode::parse("4689").expect("valid"),
        400.0,
        -2.0,
        -0.5,
        80_000_000,
    )
    .expect("valid record")
    .with_name("Loss Maker")
    .with_ratios(Ratios::new(Some(-35.0), Some(0.9), Some(-4.0), Some(0.0)).expect("finite"))
    .expect("finite");
    let adapter = FixtureStockAdapter::new().with_record(record);

    // When: They rate it
    let record = adapter
        .fetch_record(RecordRequest::parse("4689").expect("valid"))
        .await
        .expect("fixture lookup");
    let rating = evaluate(&record);

    // Then: Only the fair PBR counts
    assert_eq!(rating.score, 20);
    assert_eq!(rating.tier, Tier::HighRisk);
    assert_eq!(rating.label(), "High risk (fair-PBR)");
}

#[test]
fn user_entering_a_malformed_code_is_told_to_enter_four_digits() {
    for raw in ["", "123", "12345", "72O3", "７２０３"] {
        let error = RecordRequest::parse(raw).expect_err("malformed code");
        assert!(error.message().contains("4-digit"), "message for {raw:?}");
        assert!(!error.retryable());
    }
}

// =============================================================================
// User Journey: Configuration
// =============================================================================

#[test]
fn user_can_point_the_client_at_another_api_with_a_config_file() {
    // Given: A config file selecting a remote API and fixture-free settings
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "base_url = \"https://kabu.example.com\"").expect("write");
    writeln!(file, "timeout_ms = 2500").expect("write");
    writeln!(file, "max_retries = 0").expect("write");

    // When: The config is loaded
    let config = ClientConfig::from_file(file.path()).expect("valid config");

    // Then: Requests go to the configured API without retries
    assert_eq!(config.source, SourceId::StockApi);
    assert_eq!(config.timeout_ms, 2500);
    assert_eq!(config.retry_config(), RetryConfig::no_retry());
    let adapter = HttpStockAdapter::from_config(&config);
    assert_eq!(adapter.health_url(), "https://kabu.example.com/api/health");
}

#[test]
fn user_with_a_typo_in_the_config_gets_a_clear_error() {
    let error = ClientConfig::from_toml_str("base_ulr = \"http://localhost:5000\"")
        .expect_err("unknown key");
    assert!(error.to_string().contains("base_ulr"));
}

// =============================================================================
// User Journey: Machine-Readable Output
// =============================================================================

#[tokio::test]
async fn user_receives_failures_as_structured_envelope_errors() {
    // Given: The API is down
    let adapter = HttpStockAdapter::default()
        .with_http_client(Arc::new(FixedHttpClient(HttpResponse::new(
            503,
            r#"{"error":"maintenance"}"#,
        ))))
        .with_retry(RetryConfig::no_retry());

    // When: The lookup fails and is wrapped for output
    let error = adapter
        .fetch_record(RecordRequest::parse("7203").expect("valid"))
        .await
        .expect_err("api is down");
    let meta = EnvelopeMeta::new("req-journey-0001", "v1.0.0", Some(adapter.id()), 3)
        .expect("valid meta");
    let envelope = Envelope::with_errors(
        meta,
        serde_json::Value::Null,
        vec![EnvelopeError::from_source_error(&error, adapter.id())],
    )
    .expect("valid envelope");

    // Then: The JSON carries a stable code, the detail and the retry hint
    let json = serde_json::to_value(&envelope).expect("serializable");
    assert_eq!(json["errors"][0]["code"], "source.http_status");
    assert_eq!(json["errors"][0]["retryable"], true);
    assert_eq!(json["errors"][0]["source"], "stock_api");
    assert!(json["errors"][0]["message"]
        .as_str()
        .is_some_and(|message| message.contains("maintenance")));
    assert!(!envelope.is_ok());
}
