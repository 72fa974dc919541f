//! # Rating Engine
//!
//! Pure scoring of a [`FinancialRecord`] into a bounded 0-100 score, a
//! [`Tier`], and an ordered list of qualitative [`Factor`] tags.
//!
//! Each metric is scored against an ordered [`BandTable`]; metrics are
//! evaluated in the fixed order PER, PBR, ROE, dividend yield, and that order
//! is the order factors appear in the result. Ratios that are absent, zero,
//! negative or non-finite contribute nothing.
//!
//! ```rust
//! use kabuscore_core::{evaluate, FinancialRecord, Ratios, StockCode, Tier};
//!
//! let record = FinancialRecord::new(StockCode::parse("7203")?, 2500.0, 15.0, 0.6, 1_200_000)?
//!     .with_ratios(Ratios::new(Some(8.0), Some(1.0), Some(18.0), Some(3.5))?)?;
//!
//! let rating = evaluate(&record);
//! assert_eq!(rating.score, 80);
//! assert_eq!(rating.tier, Tier::VeryAttractive);
//! assert_eq!(
//!     rating.label(),
//!     "Very attractive (low-PER, fair-PBR, high-ROE, high-dividend)"
//! );
//! # Ok::<(), kabuscore_core::ValidationError>(())
//! ```

mod bands;
mod tier;

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::{FinancialRecord, Ratios};

pub use bands::{
    Band, BandTable, Bound, Factor, Metric, Scorecard, DIVIDEND_YIELD_BANDS, PBR_BANDS,
    PER_BANDS, ROE_BANDS,
};
pub use tier::{classify_tier, Tier};

/// Upper bound of every score.
pub const MAX_SCORE: u8 = 100;

static STANDARD_SCORECARD: LazyLock<Scorecard> = LazyLock::new(Scorecard::standard);

/// Points awarded for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub metric: Metric,
    pub value: f64,
    pub points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factor: Option<Factor>,
}

/// Outcome of rating one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingResult {
    pub score: u8,
    pub tier: Tier,
    pub factors: Vec<Factor>,
    pub contributions: Vec<Contribution>,
}

impl RatingResult {
    /// Tier description followed by the parenthesized factor list, if any.
    pub fn label(&self) -> String {
        if self.factors.is_empty() {
            return self.tier.description().to_owned();
        }

        let factors = self
            .factors
            .iter()
            .map(|factor| factor.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} ({factors})", self.tier.description())
    }
}

/// Rate a record against the standard scorecard.
pub fn evaluate(record: &FinancialRecord) -> RatingResult {
    let result = evaluate_ratios(&record.ratios);
    tracing::debug!(
        code = %record.code,
        score = result.score,
        tier = %result.tier,
        "rated record"
    );
    result
}

/// Rate bare ratios against the standard scorecard.
pub fn evaluate_ratios(ratios: &Ratios) -> RatingResult {
    evaluate_with(&STANDARD_SCORECARD, ratios)
}

/// Rate ratios against an explicit scorecard.
pub fn evaluate_with(scorecard: &Scorecard, ratios: &Ratios) -> RatingResult {
    let mut total: u32 = 0;
    let mut factors = Vec::new();
    let mut contributions = Vec::new();

    for table in scorecard.tables() {
        let metric = table.metric();
        let Some(value) = metric.usable_value(ratios) else {
            continue;
        };
        let Some(band) = table.lookup(value) else {
            continue;
        };

        total = total.saturating_add(band.points);
        if let Some(factor) = band.factor {
            factors.push(factor);
        }
        contributions.push(Contribution {
            metric,
            value,
            points: band.points,
            factor: band.factor,
        });
    }

    let score = u8::try_from(total.min(u32::from(MAX_SCORE))).unwrap_or(MAX_SCORE);

    RatingResult {
        score,
        tier: classify_tier(score),
        factors,
        contributions,
    }
}
