use thiserror::Error;

/// Validation and contract errors exposed by `kabuscore-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("stock code must be exactly 4 ASCII digits: '{value}'")]
    InvalidStockCode { value: String },

    #[error("invalid source '{value}', expected one of stock_api, fixture")]
    InvalidSource { value: String },

    #[error("timestamp must be ISO-8601 (RFC3339 or naive UTC): '{value}'")]
    InvalidTimestamp { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },

    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}
