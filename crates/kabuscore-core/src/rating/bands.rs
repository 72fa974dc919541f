use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::Ratios;

use self::Bound::{Exclusive, Inclusive, Unbounded};

/// Ratio evaluated by the rating engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Per,
    Pbr,
    Roe,
    DividendYield,
}

impl Metric {
    /// Evaluation order. Factor order in a rating follows this sequence.
    pub const ALL: [Self; 4] = [Self::Per, Self::Pbr, Self::Roe, Self::DividendYield];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Per => "per",
            Self::Pbr => "pbr",
            Self::Roe => "roe",
            Self::DividendYield => "dividend_yield",
        }
    }

    pub fn value(self, ratios: &Ratios) -> Option<f64> {
        match self {
            Self::Per => ratios.per,
            Self::Pbr => ratios.pbr,
            Self::Roe => ratios.roe,
            Self::DividendYield => ratios.dividend_yield,
        }
    }

    /// The value if it can be scored: present, finite and strictly positive.
    pub fn usable_value(self, ratios: &Ratios) -> Option<f64> {
        self.value(ratios)
            .filter(|value| value.is_finite() && *value > 0.0)
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative tag attached to a rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Factor {
    #[serde(rename = "low-PER")]
    LowPer,
    #[serde(rename = "high-PER-caution")]
    HighPerCaution,
    #[serde(rename = "fair-PBR")]
    FairPbr,
    #[serde(rename = "undervalued-PBR")]
    UndervaluedPbr,
    #[serde(rename = "high-ROE")]
    HighRoe,
    #[serde(rename = "good-ROE")]
    GoodRoe,
    #[serde(rename = "low-ROE-caution")]
    LowRoeCaution,
    #[serde(rename = "high-dividend")]
    HighDividend,
}

impl Factor {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LowPer => "low-PER",
            Self::HighPerCaution => "high-PER-caution",
            Self::FairPbr => "fair-PBR",
            Self::UndervaluedPbr => "undervalued-PBR",
            Self::HighRoe => "high-ROE",
            Self::GoodRoe => "good-ROE",
            Self::LowRoeCaution => "low-ROE-caution",
            Self::HighDividend => "high-dividend",
        }
    }
}

impl Display for Factor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One end of a band interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Unbounded,
    Inclusive(f64),
    Exclusive(f64),
}

impl Bound {
    fn admits_from_below(self, value: f64) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Inclusive(limit) => value >= limit,
            Self::Exclusive(limit) => value > limit,
        }
    }

    fn admits_from_above(self, value: f64) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Inclusive(limit) => value <= limit,
            Self::Exclusive(limit) => value < limit,
        }
    }
}

/// A value interval worth a fixed number of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub lower: Bound,
    pub upper: Bound,
    pub points: u32,
    pub factor: Option<Factor>,
}

impl Band {
    pub const fn new(lower: Bound, upper: Bound, points: u32) -> Self {
        Self {
            lower,
            upper,
            points,
            factor: None,
        }
    }

    pub const fn tagged(self, factor: Factor) -> Self {
        Self {
            factor: Some(factor),
            ..self
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower.admits_from_below(value) && self.upper.admits_from_above(value)
    }
}

/// Ordered bands for one metric. The first band containing the value wins.
#[derive(Debug, Clone, PartialEq)]
pub struct BandTable {
    metric: Metric,
    bands: Vec<Band>,
}

impl BandTable {
    pub fn new(metric: Metric, bands: impl Into<Vec<Band>>) -> Self {
        Self {
            metric,
            bands: bands.into(),
        }
    }

    pub const fn metric(&self) -> Metric {
        self.metric
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn lookup(&self, value: f64) -> Option<&Band> {
        self.bands.iter().find(|band| band.contains(value))
    }
}

/// Lower PER is better.
pub const PER_BANDS: [Band; 4] = [
    Band::new(Unbounded, Exclusive(10.0), 20).tagged(Factor::LowPer),
    Band::new(Inclusive(10.0), Exclusive(15.0), 15),
    Band::new(Inclusive(15.0), Exclusive(25.0), 10),
    Band::new(Inclusive(25.0), Unbounded, 5).tagged(Factor::HighPerCaution),
];

/// PBR close to book value (0.8 to 1.2 inclusive) is ideal.
pub const PBR_BANDS: [Band; 4] = [
    Band::new(Inclusive(0.8), Inclusive(1.2), 20).tagged(Factor::FairPbr),
    Band::new(Unbounded, Exclusive(0.8), 15).tagged(Factor::UndervaluedPbr),
    Band::new(Exclusive(1.2), Inclusive(2.0), 10),
    Band::new(Exclusive(2.0), Unbounded, 5),
];

/// Higher ROE is better.
pub const ROE_BANDS: [Band; 4] = [
    Band::new(Inclusive(15.0), Unbounded, 25).tagged(Factor::HighRoe),
    Band::new(Inclusive(10.0), Exclusive(15.0), 20).tagged(Factor::GoodRoe),
    Band::new(Inclusive(5.0), Exclusive(10.0), 15),
    Band::new(Unbounded, Exclusive(5.0), 10).tagged(Factor::LowRoeCaution),
];

pub const DIVIDEND_YIELD_BANDS: [Band; 3] = [
    Band::new(Inclusive(3.0), Unbounded, 15).tagged(Factor::HighDividend),
    Band::new(Inclusive(2.0), Exclusive(3.0), 10),
    Band::new(Unbounded, Exclusive(2.0), 5),
];

/// Band tables for all four metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct Scorecard {
    per: BandTable,
    pbr: BandTable,
    roe: BandTable,
    dividend_yield: BandTable,
}

impl Default for Scorecard {
    fn default() -> Self {
        Self::standard()
    }
}

impl Scorecard {
    /// The published thresholds.
    pub fn standard() -> Self {
        Self {
            per: BandTable::new(Metric::Per, PER_BANDS),
            pbr: BandTable::new(Metric::Pbr, PBR_BANDS),
            roe: BandTable::new(Metric::Roe, ROE_BANDS),
            dividend_yield: BandTable::new(Metric::DividendYield, DIVIDEND_YIELD_BANDS),
        }
    }

    /// Replace the bands for one metric.
    pub fn with_bands(mut self, metric: Metric, bands: impl Into<Vec<Band>>) -> Self {
        let table = BandTable::new(metric, bands);
        match metric {
            Metric::Per => self.per = table,
            Metric::Pbr => self.pbr = table,
            Metric::Roe => self.roe = table,
            Metric::DividendYield => self.dividend_yield = table,
        }
        self
    }

    pub fn table(&self, metric: Metric) -> &BandTable {
        match metric {
            Metric::Per => &self.per,
            Metric::Pbr => &self.pbr,
            Metric::Roe => &self.roe,
            Metric::DividendYield => &self.dividend_yield,
        }
    }

    /// Tables in evaluation order.
    pub fn tables(&self) -> impl Iterator<Item = &BandTable> + '_ {
        Metric::ALL.into_iter().map(|metric| self.table(metric))
    }

    /// Highest total this scorecard can award.
    pub fn max_points(&self) -> u32 {
        self.tables()
            .map(|table| {
                table
                    .bands()
                    .iter()
                    .map(|band| band.points)
                    .max()
                    .unwrap_or(0)
            })
            .sum()
    }
}
