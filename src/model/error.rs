//! Entity validation errors.

use thiserror::Error;

/// A rule violated while constructing an asset or regulatory event.
///
/// Every variant names the offending field and, where there is one, the
/// rejected value, so ingestion failures can be diagnosed from the message.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("field '{field}' cannot be empty")]
    EmptyField { field: &'static str },

    #[error("field '{field}' must be finite, got {value}")]
    NonFiniteValue { field: &'static str, value: f64 },

    #[error("field '{field}' must be non-negative, got {value}")]
    NegativeValue { field: &'static str, value: f64 },

    #[error("field '{field}' must be positive, got {value}")]
    NonPositiveValue { field: &'static str, value: f64 },

    #[error("currency must be a 3-letter uppercase ISO 4217 code: '{value}'")]
    InvalidCurrency { value: String },

    #[error("impact_score must be within [-1.0, 1.0], got {value}")]
    ImpactOutOfRange { value: f64 },

    #[error("event_date must be an ISO-8601 date or timestamp: '{value}'")]
    InvalidDate { value: String },

    #[error("additional field '{key}' must be finite")]
    NonFiniteAttribute { key: String },

    #[error("additional field keys cannot be empty")]
    EmptyAttributeKey,

    #[error("{class} asset cannot carry {kind} fields")]
    KindMismatch { class: &'static str, kind: &'static str },
}

/// Require a non-blank string field.
pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}

/// Require a finite, non-negative number.
pub(crate) fn require_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field, value });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field, value });
    }
    Ok(())
}

/// Same as [`require_non_negative`] for optional fields.
pub(crate) fn optional_non_negative(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    value.map_or(Ok(()), |v| require_non_negative(field, v))
}

/// Optional field that only has to be finite (e.g. P/E can be negative).
pub(crate) fn optional_finite(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.is_finite() => Err(ValidationError::NonFiniteValue { field, value: v }),
        _ => Ok(()),
    }
}

/// Three uppercase ASCII letters.
pub fn is_valid_currency_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

pub(crate) fn require_currency(code: &str) -> Result<(), ValidationError> {
    if !is_valid_currency_code(code) {
        return Err(ValidationError::InvalidCurrency { value: code.to_string() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_codes() {
        assert!(is_valid_currency_code("USD"));
        assert!(is_valid_currency_code("JPY"));
        assert!(!is_valid_currency_code("usd"));
        assert!(!is_valid_currency_code("US"));
        assert!(!is_valid_currency_code("USDT"));
        assert!(!is_valid_currency_code("U$D"));
    }

    #[test]
    fn test_messages_name_the_field() {
        let err = require_non_negative("price", -1.0).unwrap_err();
        assert_eq!(err.to_string(), "field 'price' must be non-negative, got -1");

        let err = require_non_negative("market_cap", f64::INFINITY).unwrap_err();
        assert!(err.to_string().contains("market_cap"));
    }

    #[test]
    fn test_optional_checks() {
        assert!(optional_non_negative("duration", None).is_ok());
        assert!(optional_non_negative("duration", Some(-0.5)).is_err());
        assert!(optional_finite("pe_ratio", Some(-12.0)).is_ok());
        assert!(optional_finite("pe_ratio", Some(f64::NAN)).is_err());
    }
}
