mod health;
mod quote;
mod rate;
mod score;

use kabuscore_core::{
    ClientConfig, Envelope, EnvelopeError, EnvelopeMeta, FixtureStockAdapter, HttpStockAdapter,
    SourceId, StockSource,
};
use serde_json::Value;
use uuid::Uuid;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub const SCHEMA_VERSION: &str = "v1.0.0";

#[derive(Debug)]
pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
    pub source: Option<SourceId>,
}

impl CommandResult {
    pub fn ok(data: Value, source: Option<SourceId>) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
            source,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_error(mut self, error: EnvelopeError) -> Self {
        self.errors.push(error);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let command_result = match &cli.command {
        Command::Score(args) => score::run(args)?,
        Command::Rate(args) => {
            let source = build_source(&resolve_config(cli)?);
            rate::run(args, source.as_ref()).await?
        }
        Command::Quote(args) => {
            let source = build_source(&resolve_config(cli)?);
            quote::run(args, source.as_ref()).await?
        }
        Command::Health => {
            let source = build_source(&resolve_config(cli)?);
            health::run(source.as_ref()).await?
        }
    };

    into_envelope(command_result)
}

/// Config file and environment, then command-line flags on top.
pub fn resolve_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    if cli.mock {
        config.source = SourceId::Fixture;
    }

    let config = config.validated()?;
    tracing::debug!(
        base_url = %config.base_url,
        source = %config.source,
        timeout_ms = config.timeout_ms,
        "resolved client config"
    );
    Ok(config)
}

pub fn build_source(config: &ClientConfig) -> Box<dyn StockSource> {
    match config.source {
        SourceId::StockApi => Box::new(HttpStockAdapter::from_config(config)),
        SourceId::Fixture => Box::new(FixtureStockAdapter::new()),
    }
}

pub fn into_envelope(result: CommandResult) -> Result<Envelope<Value>, CliError> {
    let CommandResult {
        data,
        warnings,
        errors,
        latency_ms,
        source,
    } = result;

    let mut meta = EnvelopeMeta::new(
        Uuid::new_v4().to_string(),
        SCHEMA_VERSION,
        source,
        latency_ms,
    )?;
    for warning in warnings {
        meta.push_warning(warning);
    }

    Envelope::with_errors(meta, data, errors).map_err(CliError::from)
}

fn elapsed_ms(started: std::time::Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
