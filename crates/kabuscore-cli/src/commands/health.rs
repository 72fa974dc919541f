use std::time::Instant;

use kabuscore_core::{EnvelopeError, HealthState, StockSource};
use serde_json::json;

use crate::error::CliError;

use super::{elapsed_ms, CommandResult};

pub async fn run(source: &dyn StockSource) -> Result<CommandResult, CliError> {
    let started = Instant::now();
    let status = source.health().await;
    let data = json!({ "source": source.id(), "health": status });
    let result = CommandResult::ok(data, Some(source.id())).with_latency(elapsed_ms(started));

    match status.state {
        HealthState::Healthy => Ok(result),
        HealthState::Degraded => Ok(result.with_warning(format!(
            "{} reports degraded health",
            source.id()
        ))),
        HealthState::Unhealthy => {
            let message = status
                .message
                .clone()
                .unwrap_or_else(|| format!("{} is unhealthy", source.id()));
            let mut error = EnvelopeError::new("source.unhealthy", message)?;
            error.source = Some(source.id());
            Ok(result.with_error(error))
        }
    }
}
