mod report;

use std::io::{self, Write};

use kabuscore_core::Envelope;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render(
    envelope: &Envelope<Value>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            writeln!(stdout, "{payload}")?;
        }
        OutputFormat::Table => {
            for line in table_lines(envelope)? {
                writeln!(stdout, "{line}")?;
            }
        }
    }

    stdout.flush()?;
    Ok(())
}

fn table_lines(envelope: &Envelope<Value>) -> Result<Vec<String>, CliError> {
    let mut lines = match report::lines(&envelope.data)? {
        Some(lines) => lines,
        None => serde_json::to_string_pretty(&envelope.data)?
            .lines()
            .map(str::to_owned)
            .collect(),
    };

    if !envelope.meta.warnings.is_empty() {
        lines.push(String::new());
        lines.push(String::from("warnings:"));
        for warning in &envelope.meta.warnings {
            lines.push(format!("  - {warning}"));
        }
    }

    if !envelope.errors.is_empty() {
        lines.push(String::new());
        lines.push(String::from("errors:"));
        for error in &envelope.errors {
            lines.push(format!("  - {}: {}", error.code, error.message));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "request {} | {} | {} ms",
        envelope.meta.request_id,
        envelope
            .meta
            .source
            .map_or("offline", |source| source.as_str()),
        envelope.meta.latency_ms
    ));

    Ok(lines)
}
