//! Derivation of valuation ratios from raw upstream figures.
//!
//! Upstream data providers report per-share earnings and book value plus
//! fractional return/yield figures; the rating engine works on ratios and
//! percentages rounded to two decimals.

use serde::{Deserialize, Serialize};

use crate::{Ratios, ValidationError};

/// Raw per-share and fractional figures as reported by a data provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFundamentals {
    /// Trailing earnings per share.
    pub trailing_eps: Option<f64>,
    /// Book value per share.
    pub book_value: Option<f64>,
    /// Return on equity as a fraction (0.12 = 12%).
    pub return_on_equity: Option<f64>,
    /// Dividend yield as a fraction (0.025 = 2.5%).
    pub dividend_yield: Option<f64>,
}

impl RawFundamentals {
    /// Compute scoring ratios at `price`.
    ///
    /// PER and PBR are absent when the denominator is missing or not positive.
    /// ROE and dividend yield are converted to percent when present and
    /// non-zero; a reported zero is passed through unchanged.
    pub fn derive(&self, price: f64) -> Result<Ratios, ValidationError> {
        let per = per_share_ratio(price, self.trailing_eps);
        let pbr = per_share_ratio(price, self.book_value);
        let roe = self.return_on_equity.map(to_percent);
        let dividend_yield = self.dividend_yield.map(to_percent);

        Ratios::new(per, pbr, roe, dividend_yield)
    }
}

/// Closing prices of the two most recent sessions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub latest_close: f64,
    pub previous_close: f64,
}

impl PriceHistory {
    /// A history with a single session compares the close against itself.
    pub const fn single(close: f64) -> Self {
        Self {
            latest_close: close,
            previous_close: close,
        }
    }

    /// Change versus prior close as `(change, change_percent)`, both rounded.
    pub fn change(&self) -> (f64, f64) {
        let change = self.latest_close - self.previous_close;
        let percent = if self.previous_close == 0.0 {
            0.0
        } else {
            round2(change / self.previous_close * 100.0)
        };
        (round2(change), percent)
    }
}

/// Round to two decimals, ties to even (`round2(0.125) == 0.12`).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

fn per_share_ratio(price: f64, denominator: Option<f64>) -> Option<f64> {
    denominator
        .filter(|value| *value > 0.0)
        .map(|value| round2(price / value))
}

fn to_percent(fraction: f64) -> f64 {
    if fraction == 0.0 {
        fraction
    } else {
        round2(fraction * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_ratios_from_per_share_figures() {
        let raw = RawFundamentals {
            trailing_eps: Some(250.0),
            book_value: Some(2000.0),
            return_on_equity: Some(0.1234),
            dividend_yield: Some(0.0285),
        };

        let ratios = raw.derive(2500.0).expect("finite ratios");
        assert_eq!(ratios.per, Some(10.0));
        assert_eq!(ratios.pbr, Some(1.25));
        assert_eq!(ratios.roe, Some(12.34));
        assert_eq!(ratios.dividend_yield, Some(2.85));
    }

    #[test]
    fn non_positive_denominators_leave_ratio_absent() {
        let raw = RawFundamentals {
            trailing_eps: Some(-15.0),
            book_value: Some(0.0),
            ..RawFundamentals::default()
        };

        let ratios = raw.derive(1000.0).expect("finite ratios");
        assert_eq!(ratios.per, None);
        assert_eq!(ratios.pbr, None);
        assert_eq!(ratios.roe, None);
        assert_eq!(ratios.dividend_yield, None);
    }

    #[test]
    fn price_change_is_rounded() {
        let history = PriceHistory {
            latest_close: 2512.347,
            previous_close: 2500.0,
        };
        let (change, percent) = history.change();
        assert_eq!(change, 12.35);
        assert_eq!(percent, 0.49);
    }

    #[test]
    fn halfway_values_round_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-0.125), -0.12);
        assert_eq!(round2(2.5), 2.5);
    }

    #[test]
    fn single_session_has_no_change() {
        assert_eq!(PriceHistory::single(1800.0).change(), (0.0, 0.0));
        assert_eq!(PriceHistory::single(0.0).change(), (0.0, 0.0));
    }
}
