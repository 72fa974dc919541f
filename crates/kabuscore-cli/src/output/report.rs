//! Human-readable report for `--format table`.
//!
//! Rebuilds typed records from the envelope data so formatting stays out of
//! the command handlers.

use kabuscore_core::{FinancialRecord, HealthState, HealthStatus, RatingResult, Ratios, Tier};
use serde_json::Value;

use crate::error::CliError;

/// Report lines for known data shapes, or `None` when nothing matches.
pub fn lines(data: &Value) -> Result<Option<Vec<String>>, CliError> {
    let mut lines = Vec::new();

    if let Some(record) = typed::<FinancialRecord>(data, "record")? {
        lines.extend(record_lines(&record));
    } else if let Some(ratios) = typed::<Ratios>(data, "ratios")? {
        lines.extend(ratio_lines(&ratios));
    }

    if let Some(rating) = typed::<RatingResult>(data, "rating")? {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.extend(rating_lines(&rating));
    }

    if let Some(health) = typed::<HealthStatus>(data, "health")? {
        let state = match health.state {
            HealthState::Healthy => "healthy",
            HealthState::Degraded => "degraded",
            HealthState::Unhealthy => "unhealthy",
        };
        lines.push(format!("health      : {state}"));
        if let Some(message) = &health.message {
            lines.push(format!("message     : {message}"));
        }
        lines.push(format!("checked_at  : {}", health.checked_at));
    }

    if lines.is_empty() && data.get("record").is_some_and(Value::is_null) {
        lines.push(String::from("no data"));
    }

    Ok((!lines.is_empty()).then_some(lines))
}

fn typed<T: serde::de::DeserializeOwned>(data: &Value, key: &str) -> Result<Option<T>, CliError> {
    match data.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Ok(Some(T::deserialize(value)?)),
    }
}

fn record_lines(record: &FinancialRecord) -> Vec<String> {
    let mut lines = vec![
        format!("{} ({})", record.display_name(), record.code),
        format!("price       : {}", format_amount(record.price)),
        format!(
            "change      : {}",
            format_change(record.change, record.change_percent)
        ),
        format!("volume      : {}", group_thousands(&record.volume.to_string())),
    ];
    lines.extend(ratio_lines(&record.ratios));

    let profile = &record.profile;
    if let Some(market_cap) = profile.market_cap {
        lines.push(format!("market_cap  : {}", format_amount(market_cap.round())));
    }
    if let Some(sector) = &profile.sector {
        lines.push(format!("sector      : {sector}"));
    }
    if let Some(industry) = &profile.industry {
        lines.push(format!("industry    : {industry}"));
    }
    if let Some(last_updated) = &profile.last_updated {
        lines.push(format!("updated     : {last_updated}"));
    }
    lines
}

fn ratio_lines(ratios: &Ratios) -> Vec<String> {
    vec![
        format!("PER         : {}", format_ratio(ratios.per, "x")),
        format!("PBR         : {}", format_ratio(ratios.pbr, "x")),
        format!("ROE         : {}", format_ratio(ratios.roe, "%")),
        format!("dividend    : {}", format_ratio(ratios.dividend_yield, "%")),
    ]
}

fn rating_lines(rating: &RatingResult) -> Vec<String> {
    let mut lines = vec![
        format!("score       : {}/100", rating.score),
        format!(
            "tier        : {} [{}]",
            rating.tier.description(),
            tier_color(rating.tier)
        ),
    ];
    if !rating.factors.is_empty() {
        let factors = rating
            .factors
            .iter()
            .map(|factor| factor.as_str())
            .collect::<Vec<_>>();
        lines.push(format!("factors     : {}", factors.join(", ")));
    }
    lines.push(format!("label       : {}", rating.label()));
    lines
}

/// Display color associated with each tier.
pub const fn tier_color(tier: Tier) -> &'static str {
    match tier {
        Tier::VeryAttractive => "#28a745",
        Tier::ConsiderInvesting => "#17a2b8",
        Tier::CautionAdvised => "#ffc107",
        Tier::HighRisk => "#dc3545",
    }
}

/// Absent and zero-sentinel ratios render as `-`.
fn format_ratio(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(value) if value != 0.0 => format!("{value:.2}{unit}"),
        _ => String::from("-"),
    }
}

fn format_change(change: f64, change_percent: f64) -> String {
    let sign = if change > 0.0 { "+" } else { "" };
    let percent_sign = if change_percent > 0.0 { "+" } else { "" };
    format!("{sign}{change:.2} ({percent_sign}{change_percent:.2}%)")
}

fn format_amount(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((&formatted, "00"));
    let sign = if value < 0.0 { "-" } else { "" };
    let grouped = group_thousands(whole);
    if fraction == "00" {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
