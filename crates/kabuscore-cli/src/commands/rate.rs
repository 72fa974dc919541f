use std::time::Instant;

use kabuscore_core::{
    evaluate, EnvelopeError, FinancialRecord, RatingResult, RecordRequest, StockCode, StockSource,
};
use serde::Serialize;

use crate::cli::CodeArgs;
use crate::error::CliError;

use super::{elapsed_ms, CommandResult};

#[derive(Debug, Serialize)]
struct RateResponseData {
    record: Option<FinancialRecord>,
    rating: Option<RatingResult>,
    label: Option<String>,
}

pub async fn run(args: &CodeArgs, source: &dyn StockSource) -> Result<CommandResult, CliError> {
    let code = StockCode::parse(&args.code)?;
    let started = Instant::now();

    match source.fetch_record(RecordRequest::new(code)).await {
        Ok(record) => {
            let rating = evaluate(&record);
            let no_ratios = rating.contributions.is_empty();
            let data = serde_json::to_value(RateResponseData {
                label: Some(rating.label()),
                record: Some(record),
                rating: Some(rating),
            })?;

            let mut result =
                CommandResult::ok(data, Some(source.id())).with_latency(elapsed_ms(started));
            if no_ratios {
                result = result.with_warning("no usable valuation ratios; score is 0");
            }
            Ok(result)
        }
        Err(error) => {
            tracing::warn!(code = %args.code.trim(), error = %error, "stock lookup failed");
            let data = serde_json::to_value(RateResponseData {
                record: None,
                rating: None,
                label: None,
            })?;
            Ok(CommandResult::ok(data, Some(source.id()))
                .with_error(EnvelopeError::from_source_error(&error, source.id()))
                .with_latency(elapsed_ms(started)))
        }
    }
}

#[cfg(test)]
mod tests {
    use kabuscore_core::{FixtureStockAdapter, Ratios, SourceId};

    use super::*;

    fn args(code: &str) -> CodeArgs {
        CodeArgs {
            code: code.to_owned(),
        }
    }

    fn pinned(code: &str, ratios: Ratios) -> FixtureStockAdapter {
        let record = FinancialRecord::new(
            StockCode::parse(code).expect("valid code"),
            2500.0,
            15.0,
            0.6,
            12_500_000,
        )
        .expect("valid record")
        .with_name("Pinned Motors")
        .with_ratios(ratios)
        .expect("finite ratios");
        FixtureStockAdapter::new().with_record(record)
    }

    #[tokio::test]
    async fn rates_fetched_record() {
        let ratios = Ratios::new(Some(8.0), Some(1.0), Some(18.0), Some(3.5)).expect("finite");
        let source = pinned("7203", ratios);

        let result = run(&args("7203"), &source).await.expect("command succeeds");

        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(result.source, Some(SourceId::Fixture));
        assert_eq!(result.data["rating"]["score"], 80);
        assert_eq!(result.data["rating"]["tier"], "very-attractive");
        assert_eq!(
            result.data["label"],
            "Very attractive (low-PER, fair-PBR, high-ROE, high-dividend)"
        );
        assert_eq!(result.data["record"]["name"], "Pinned Motors");
    }

    #[tokio::test]
    async fn warns_when_no_ratio_is_usable() {
        let source = pinned("9999", Ratios::empty());

        let result = run(&args("9999"), &source).await.expect("command succeeds");

        assert_eq!(result.data["rating"]["score"], 0);
        assert_eq!(result.data["rating"]["tier"], "high-risk");
        assert_eq!(result.warnings.len(), 1);
    }

    #[tokio::test]
    async fn rejects_malformed_code_before_lookup() {
        let source = FixtureStockAdapter::new();
        let error = run(&args("123"), &source).await.expect_err("invalid code");
        assert_eq!(error.exit_code(), 2);
    }
}
