//! Domain errors raised by converters
//!
//! Every error is terminal and carries a fixed, human-readable message plus a
//! machine-readable code. Converters never recover from their own errors.

use crate::{DeclaredType, TokenKind, TypeKind};
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const UNEXPECTED_VALUE_TYPE: &str = "UNEXPECTED_VALUE_TYPE";
    pub const PRE_EPOCH_VALUE: &str = "PRE_EPOCH_VALUE";
    pub const NULL_NOT_ALLOWED: &str = "NULL_NOT_ALLOWED";
    pub const INVALID_STRING_VALUE: &str = "INVALID_STRING_VALUE";
    pub const UNEXPECTED_TOKEN: &str = "UNEXPECTED_TOKEN";
    pub const UNEXPECTED_EXISTING_VALUE_TYPE: &str = "UNEXPECTED_EXISTING_VALUE_TYPE";
    pub const OUT_OF_RANGE: &str = "OUT_OF_RANGE";
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Write given a value the converter cannot represent.
    /// `required` names the strictly-typed shape, if there is one.
    #[error("{}", unexpected_value_message(.required))]
    UnexpectedValueType { required: Option<TypeKind> },

    /// Millisecond count is negative. `target` is absent on write.
    #[error("{}", pre_epoch_message(.target))]
    PreEpochValue { target: Option<DeclaredType> },

    #[error("Cannot convert null value to {target}.")]
    NullNotAllowed { target: DeclaredType },

    #[error("Cannot convert invalid value to {target}.")]
    InvalidStringValue { target: DeclaredType },

    #[error("Unexpected token parsing date. Expected Integer or String, got {found}.")]
    UnexpectedToken { found: TokenKind },

    #[error("Converter cannot read JSON with the specified existing value. {required} is required.")]
    UnexpectedExistingValueType { required: TypeKind },

    /// Millisecond count lands after the last representable instant
    #[error("Cannot convert value that is after 23:59:59.999 UTC on 31 December 9999 to {target}.")]
    OutOfRange { target: DeclaredType },
}

fn unexpected_value_message(required: &Option<TypeKind>) -> String {
    match required {
        Some(kind) => format!("Converter cannot write specified value to JSON. {} is required.", kind),
        None => "Expected date object value.".to_string(),
    }
}

fn pre_epoch_message(target: &Option<DeclaredType>) -> String {
    match target {
        Some(target) => format!(
            "Cannot convert value that is before Unix epoch of 00:00:00 UTC on 1 January 1970 to {}.",
            target
        ),
        None => "Cannot convert date value that is before Unix epoch of 00:00:00 UTC on 1 January 1970."
            .to_string(),
    }
}

impl DomainError {
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::UnexpectedValueType { .. } => codes::UNEXPECTED_VALUE_TYPE,
            DomainError::PreEpochValue { .. } => codes::PRE_EPOCH_VALUE,
            DomainError::NullNotAllowed { .. } => codes::NULL_NOT_ALLOWED,
            DomainError::InvalidStringValue { .. } => codes::INVALID_STRING_VALUE,
            DomainError::UnexpectedToken { .. } => codes::UNEXPECTED_TOKEN,
            DomainError::UnexpectedExistingValueType { .. } => codes::UNEXPECTED_EXISTING_VALUE_TYPE,
            DomainError::OutOfRange { .. } => codes::OUT_OF_RANGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_messages() {
        let err = DomainError::UnexpectedValueType { required: None };
        assert_eq!(err.to_string(), "Expected date object value.");

        let err = DomainError::UnexpectedValueType { required: Some(TypeKind::String) };
        assert_eq!(err.to_string(), "Converter cannot write specified value to JSON. String is required.");

        let err = DomainError::PreEpochValue { target: None };
        assert_eq!(
            err.to_string(),
            "Cannot convert date value that is before Unix epoch of 00:00:00 UTC on 1 January 1970."
        );
    }

    #[test]
    fn test_read_messages() {
        let dt = DeclaredType::of(TypeKind::DateTime);
        assert_eq!(
            DomainError::PreEpochValue { target: Some(dt) }.to_string(),
            "Cannot convert value that is before Unix epoch of 00:00:00 UTC on 1 January 1970 to DateTime."
        );
        assert_eq!(
            DomainError::NullNotAllowed { target: dt }.to_string(),
            "Cannot convert null value to DateTime."
        );
        assert_eq!(
            DomainError::InvalidStringValue { target: DeclaredType::of(TypeKind::DateTimeOffset) }.to_string(),
            "Cannot convert invalid value to DateTimeOffset."
        );
        assert_eq!(
            DomainError::UnexpectedToken { found: TokenKind::Boolean }.to_string(),
            "Unexpected token parsing date. Expected Integer or String, got Boolean."
        );
        assert_eq!(
            DomainError::UnexpectedExistingValueType { required: TypeKind::String }.to_string(),
            "Converter cannot read JSON with the specified existing value. String is required."
        );
    }

    #[test]
    fn test_codes() {
        assert_eq!(DomainError::NullNotAllowed { target: DeclaredType::of(TypeKind::DateTime) }.code(), codes::NULL_NOT_ALLOWED);
        assert_eq!(DomainError::UnexpectedToken { found: TokenKind::Float }.code(), "UNEXPECTED_TOKEN");
    }
}
