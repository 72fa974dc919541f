//! # Domain Models
//!
//! Canonical domain types for a single security lookup.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`StockCode`] | Validated 4-digit security code |
//! | [`FinancialRecord`] | Market and fundamental snapshot |
//! | [`Ratios`] | Optional valuation ratios (PER, PBR, ROE, dividend yield) |
//! | [`CompanyProfile`] | Descriptive, non-scored company data |
//! | [`RawFundamentals`] | Per-share figures ratios are derived from |
//! | [`PriceHistory`] | Latest and prior close used for price change |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Construction validates numeric invariants: prices are finite and
//! non-negative, deltas and ratios are finite.

mod code;
mod metrics;
mod record;
mod timestamp;

pub use code::StockCode;
pub use metrics::{round2, PriceHistory, RawFundamentals};
pub use record::{CompanyProfile, FinancialRecord, Ratios};
pub use timestamp::UtcDateTime;
