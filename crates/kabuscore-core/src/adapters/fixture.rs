use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use crate::data_source::{HealthStatus, RecordRequest, SourceError, StockSource};
use crate::{
    round2, CompanyProfile, FinancialRecord, PriceHistory, RawFundamentals, SourceId, StockCode,
    UtcDateTime,
};

/// Deterministic offline source for `--mock` runs and tests.
///
/// Unknown codes get synthetic but stable data derived from the code; pinned
/// records are returned verbatim.
#[derive(Debug, Clone, Default)]
pub struct FixtureStockAdapter {
    pinned: HashMap<StockCode, FinancialRecord>,
}

impl FixtureStockAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `record` for its code instead of synthetic data.
    pub fn with_record(mut self, record: FinancialRecord) -> Self {
        self.pinned.insert(record.code.clone(), record);
        self
    }

    fn lookup(&self, code: &StockCode) -> Result<FinancialRecord, SourceError> {
        match self.pinned.get(code) {
            Some(record) => Ok(record.clone()),
            None => synthesize(code),
        }
    }
}

impl StockSource for FixtureStockAdapter {
    fn id(&self) -> SourceId {
        SourceId::Fixture
    }

    fn fetch_record<'a>(
        &'a self,
        req: RecordRequest,
    ) -> Pin<Box<dyn Future<Output = Result<FinancialRecord, SourceError>> + Send + 'a>> {
        Box::pin(async move { self.lookup(&req.code) })
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        Box::pin(async move { HealthStatus::healthy("fixture data available") })
    }
}

fn synthesize(code: &StockCode) -> Result<FinancialRecord, SourceError> {
    let seed = code.seed();
    let step = |modulus: u64, salt: u64| (seed.wrapping_add(salt) % modulus) as f64;

    let latest_close = round2(500.0 + step(9_500, 0) + step(100, 7) / 100.0);
    let drift = (step(41, 13) - 20.0) / 1_000.0;
    let history = PriceHistory {
        latest_close,
        previous_close: round2(latest_close / (1.0 + drift)),
    };
    let (change, change_percent) = history.change();

    let raw = RawFundamentals {
        trailing_eps: Some(latest_close / (6.0 + step(30, 3))),
        book_value: Some(latest_close / (0.5 + step(25, 5) / 10.0)),
        return_on_equity: Some(step(250, 11) / 10_000.0),
        dividend_yield: Some(step(45, 17) / 1_000.0),
    };
    let ratios = raw.derive(latest_close)?;

    let profile = CompanyProfile {
        market_cap: Some(latest_close * (1_000_000.0 + step(9_000_000, 19) * 100.0)),
        sector: Some(String::from("Fixture")),
        industry: None,
        last_updated: Some(UtcDateTime::now()),
    };

    let record = FinancialRecord::new(
        code.clone(),
        latest_close,
        change,
        change_percent,
        10_000 + seed % 5_000_000,
    )?
    .with_name(format!("Fixture {code}"))
    .with_ratios(ratios)?
    .with_profile(profile)?;

    Ok(record)
}
