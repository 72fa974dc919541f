use serde::{Deserialize, Serialize};

use crate::data_source::SourceError;
use crate::{SourceId, UtcDateTime, ValidationError};

/// Standard response envelope for all machine-readable `kabuscore` output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub meta: EnvelopeMeta,
    pub data: T,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<EnvelopeError>,
}

impl<T> Envelope<T> {
    pub fn success(meta: EnvelopeMeta, data: T) -> Self {
        Self {
            meta,
            data,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(
        meta: EnvelopeMeta,
        data: T,
        errors: Vec<EnvelopeError>,
    ) -> Result<Self, ValidationError> {
        meta.validate()?;
        for error in &errors {
            error.validate()?;
        }

        Ok(Self { meta, data, errors })
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Metadata attached to every envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeMeta {
    pub request_id: String,
    pub schema_version: String,
    pub generated_at: UtcDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceId>,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl EnvelopeMeta {
    pub fn new(
        request_id: impl Into<String>,
        schema_version: impl Into<String>,
        source: Option<SourceId>,
        latency_ms: u64,
    ) -> Result<Self, ValidationError> {
        let meta = Self {
            request_id: request_id.into(),
            schema_version: schema_version.into(),
            generated_at: UtcDateTime::now(),
            source,
            latency_ms,
            warnings: Vec::new(),
        };
        meta.validate()?;
        Ok(meta)
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.request_id.trim().len() < 8 {
            return Err(ValidationError::InvalidRequestId);
        }

        if !is_valid_schema_version(&self.schema_version) {
            return Err(ValidationError::InvalidSchemaVersion {
                value: self.schema_version.clone(),
            });
        }

        Ok(())
    }
}

/// Structured error entry carried in an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceId>,
}

impl EnvelopeError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Result<Self, ValidationError> {
        let error = Self {
            code: code.into(),
            message: message.into(),
            retryable: None,
            source: None,
        };
        error.validate()?;
        Ok(error)
    }

    pub fn from_source_error(error: &SourceError, source: SourceId) -> Self {
        Self {
            code: error.code().to_owned(),
            message: error.message().to_owned(),
            retryable: Some(error.retryable()),
            source: Some(source),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.code.trim().is_empty() {
            return Err(ValidationError::EmptyErrorCode);
        }
        if self.message.trim().is_empty() {
            return Err(ValidationError::EmptyErrorMessage);
        }
        Ok(())
    }
}

fn is_valid_schema_version(value: &str) -> bool {
    let Some(rest) = value.strip_prefix('v') else {
        return false;
    };
    let parts = rest.split('.').collect::<Vec<_>>();
    parts.len() == 3
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|ch| ch.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_request_id() {
        let err = EnvelopeMeta::new("abc", "v1.0.0", None, 0).expect_err("must fail");
        assert_eq!(err, ValidationError::InvalidRequestId);
    }

    #[test]
    fn rejects_bad_schema_version() {
        for version in ["1.0.0", "v1.0", "v1.x.0", "v1..0"] {
            let err = EnvelopeMeta::new("request-0001", version, None, 0).expect_err("must fail");
            assert!(matches!(err, ValidationError::InvalidSchemaVersion { .. }));
        }
    }

    #[test]
    fn source_errors_become_envelope_errors() {
        let source_error = SourceError::http_status(503, "stock api returned status 503");
        let error = EnvelopeError::from_source_error(&source_error, SourceId::StockApi);
        assert_eq!(error.code, "source.http_status");
        assert_eq!(error.retryable, Some(true));
        assert_eq!(error.source, Some(SourceId::StockApi));
    }

    #[test]
    fn empty_errors_are_omitted_from_json() {
        let meta = EnvelopeMeta::new("request-0001", "v1.0.0", Some(SourceId::Fixture), 12)
            .expect("valid meta");
        let envelope = Envelope::success(meta, serde_json::json!({"score": 80}));
        let value = serde_json::to_value(&envelope).expect("serializable");

        assert!(value.get("errors").is_none());
        assert_eq!(value["meta"]["source"], "fixture");
        assert!(envelope.is_ok());
    }

    #[test]
    fn rejects_blank_error_message() {
        let err = EnvelopeError::new("source.unavailable", "  ").expect_err("must fail");
        assert_eq!(err, ValidationError::EmptyErrorMessage);
    }
}
