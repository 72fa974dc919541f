use std::time::Instant;

use kabuscore_core::{EnvelopeError, FinancialRecord, RecordRequest, StockCode, StockSource};
use serde::Serialize;

use crate::cli::CodeArgs;
use crate::error::CliError;

use super::{elapsed_ms, CommandResult};

#[derive(Debug, Serialize)]
struct QuoteResponseData {
    record: Option<FinancialRecord>,
}

pub async fn run(args: &CodeArgs, source: &dyn StockSource) -> Result<CommandResult, CliError> {
    let code = StockCode::parse(&args.code)?;
    let started = Instant::now();

    match source.fetch_record(RecordRequest::new(code)).await {
        Ok(record) => {
            let data = serde_json::to_value(QuoteResponseData {
                record: Some(record),
            })?;
            Ok(CommandResult::ok(data, Some(source.id())).with_latency(elapsed_ms(started)))
        }
        Err(error) => {
            let data = serde_json::to_value(QuoteResponseData { record: None })?;
            Ok(CommandResult::ok(data, Some(source.id()))
                .with_error(EnvelopeError::from_source_error(&error, source.id()))
                .with_latency(elapsed_ms(started)))
        }
    }
}
