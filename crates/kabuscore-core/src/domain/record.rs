use serde::{Deserialize, Serialize};

use crate::{StockCode, UtcDateTime, ValidationError};

/// Valuation ratios used by the rating engine.
///
/// A ratio may be absent (`None`), or present with any finite value. Present
/// values that are zero or negative are kept as-is; the rating engine decides
/// whether they are usable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ratios {
    /// Price to earnings.
    pub per: Option<f64>,
    /// Price to book.
    pub pbr: Option<f64>,
    /// Return on equity, in percent.
    pub roe: Option<f64>,
    /// Annual dividend yield, in percent.
    pub dividend_yield: Option<f64>,
}

impl Ratios {
    pub fn new(
        per: Option<f64>,
        pbr: Option<f64>,
        roe: Option<f64>,
        dividend_yield: Option<f64>,
    ) -> Result<Self, ValidationError> {
        validate_optional_finite("per", per)?;
        validate_optional_finite("pbr", pbr)?;
        validate_optional_finite("roe", roe)?;
        validate_optional_finite("dividend_yield", dividend_yield)?;

        Ok(Self {
            per,
            pbr,
            roe,
            dividend_yield,
        })
    }

    pub const fn empty() -> Self {
        Self {
            per: None,
            pbr: None,
            roe: None,
            dividend_yield: None,
        }
    }
}

/// Descriptive company data carried alongside a record. Never scored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub market_cap: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub last_updated: Option<UtcDateTime>,
}

/// Market and fundamental snapshot for a single security.
///
/// Deserialization runs the same checks as [`FinancialRecord::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RecordFields")]
pub struct FinancialRecord {
    pub code: StockCode,
    pub name: Option<String>,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    #[serde(flatten)]
    pub ratios: Ratios,
    #[serde(flatten)]
    pub profile: CompanyProfile,
}

impl FinancialRecord {
    pub fn new(
        code: StockCode,
        price: f64,
        change: f64,
        change_percent: f64,
        volume: u64,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("price", price)?;
        validate_finite("change", change)?;
        validate_finite("change_percent", change_percent)?;

        Ok(Self {
            code,
            name: None,
            price,
            change,
            change_percent,
            volume,
            ratios: Ratios::empty(),
            profile: CompanyProfile::default(),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_ratios(mut self, ratios: Ratios) -> Result<Self, ValidationError> {
        self.ratios = Ratios::new(ratios.per, ratios.pbr, ratios.roe, ratios.dividend_yield)?;
        Ok(self)
    }

    pub fn with_profile(mut self, profile: CompanyProfile) -> Result<Self, ValidationError> {
        validate_optional_non_negative("market_cap", profile.market_cap)?;
        self.profile = profile;
        Ok(self)
    }

    /// Display label: the company name, or the code when no name is known.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.code.as_str())
    }
}

#[derive(Deserialize)]
struct RecordFields {
    code: StockCode,
    name: Option<String>,
    price: f64,
    change: f64,
    change_percent: f64,
    volume: u64,
    #[serde(flatten)]
    ratios: Ratios,
    #[serde(flatten)]
    profile: CompanyProfile,
}

impl TryFrom<RecordFields> for FinancialRecord {
    type Error = ValidationError;

    fn try_from(fields: RecordFields) -> Result<Self, Self::Error> {
        let mut record = Self::new(
            fields.code,
            fields.price,
            fields.change,
            fields.change_percent,
            fields.volume,
        )?
        .with_ratios(fields.ratios)?
        .with_profile(fields.profile)?;
        record.name = fields.name;
        Ok(record)
    }
}

fn validate_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    Ok(())
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    validate_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

fn validate_optional_non_negative(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        validate_non_negative(field, value)?;
    }
    Ok(())
}

fn validate_optional_finite(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        validate_finite(field, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code() -> StockCode {
        StockCode::parse("7203").expect("valid code")
    }

    #[test]
    fn rejects_negative_price() {
        let err = FinancialRecord::new(code(), -1.0, 0.0, 0.0, 0).expect_err("must fail");
        assert_eq!(err, ValidationError::NegativeValue { field: "price" });
    }

    #[test]
    fn rejects_non_finite_change() {
        let err = FinancialRecord::new(code(), 10.0, f64::NAN, 0.0, 0).expect_err("must fail");
        assert_eq!(err, ValidationError::NonFiniteValue { field: "change" });
    }

    #[test]
    fn keeps_non_positive_ratios_as_present() {
        let record = FinancialRecord::new(code(), 2500.0, -12.5, -0.5, 1_000)
            .expect("valid record")
            .with_ratios(Ratios {
                per: Some(0.0),
                pbr: Some(-1.0),
                ..Ratios::default()
            })
            .expect("finite ratios");

        assert_eq!(record.ratios.per, Some(0.0));
        assert_eq!(record.ratios.pbr, Some(-1.0));
        assert_eq!(record.ratios.roe, None);
    }

    #[test]
    fn rejects_infinite_ratio() {
        let err = Ratios::new(None, None, Some(f64::INFINITY), None).expect_err("must fail");
        assert_eq!(err, ValidationError::NonFiniteValue { field: "roe" });
    }

    #[test]
    fn display_name_falls_back_to_code() {
        let record = FinancialRecord::new(code(), 1.0, 0.0, 0.0, 0).expect("valid");
        assert_eq!(record.display_name(), "7203");
        assert_eq!(record.with_name("Toyota").display_name(), "Toyota");
    }

    #[test]
    fn serializes_flat_wire_shape() {
        let record = FinancialRecord::new(code(), 2500.0, 10.0, 0.4, 100)
            .expect("valid")
            .with_ratios(Ratios::new(Some(9.5), None, None, None).expect("finite"))
            .expect("finite");
        let value = serde_json::to_value(&record).expect("serializable");

        assert_eq!(value["code"], "7203");
        assert_eq!(value["per"], 9.5);
        assert!(value["pbr"].is_null());
        assert!(value.get("ratios").is_none());
    }

    #[test]
    fn deserialization_applies_constructor_checks() {
        let valid = serde_json::json!({
            "code": "7203",
            "name": "Toyota",
            "price": 2500.0,
            "change": -10.0,
            "change_percent": -0.4,
            "volume": 100,
            "per": 9.5,
            "market_cap": 1.0e12,
        });
        let record: FinancialRecord = serde_json::from_value(valid.clone()).expect("valid record");
        assert_eq!(record.display_name(), "Toyota");
        assert_eq!(record.ratios.per, Some(9.5));
        assert_eq!(record.profile.market_cap, Some(1.0e12));

        let mut negative_price = valid.clone();
        negative_price["price"] = serde_json::json!(-1.0);
        let err = serde_json::from_value::<FinancialRecord>(negative_price)
            .expect_err("negative price must be rejected");
        assert!(err.to_string().contains("price"), "unexpected error: {err}");

        let mut negative_cap = valid;
        negative_cap["market_cap"] = serde_json::json!(-5.0);
        assert!(serde_json::from_value::<FinancialRecord>(negative_cap).is_err());
    }
}
