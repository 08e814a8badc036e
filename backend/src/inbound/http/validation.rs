//! Shared validation helpers for inbound HTTP adapters.

use std::str::FromStr;

use chrono::NaiveDate;
use serde_json::json;

use crate::domain::{Error, Money};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidAmount,
    InvalidDate,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidAmount => "invalid_amount",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

/// Reject a field that failed a domain rule, keeping the domain's wording.
pub(crate) fn invalid_field_error(field: FieldName, message: impl Into<String>) -> Error {
    ValidationError::new(field.as_str(), message).with_code(ErrorCode::InvalidValue)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

/// Parse any UUID-backed identifier.
pub(crate) fn parse_id<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = uuid::Error>,
{
    T::from_str(value.trim()).map_err(|_| invalid_uuid_error(field, value))
}

/// Require a non-blank string field.
pub(crate) fn require_text(value: Option<String>, field: FieldName) -> Result<String, Error> {
    value
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| missing_field_error(field))
}

/// Convert a JSON number in major units to [`Money`], rounding to the cent.
pub(crate) fn parse_amount(value: Option<f64>, field: FieldName) -> Result<Money, Error> {
    let raw = value.ok_or_else(|| missing_field_error(field))?;
    Money::from_major(raw).map_err(|err| {
        let name = field.as_str();
        ValidationError::new(name, format!("{name} {err}"))
            .with_value(ErrorCode::InvalidAmount, raw.to_string())
    })
}

pub(crate) fn parse_optional_date(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<NaiveDate>, Error> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                let name = field.as_str();
                ValidationError::new(name, format!("{name} must be a YYYY-MM-DD date"))
                    .with_value(ErrorCode::InvalidDate, raw.clone())
            })
        })
        .transpose()
}
