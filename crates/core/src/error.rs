//! Domain error model.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures of the lifecycle log (validation,
/// ordering, missing serials). Storage failures belong to the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input was malformed or a required value was missing/blank.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A new event would land before the serial's current latest event.
    #[error("event_date {attempted} is before latest event date {latest}")]
    Ordering {
        attempted: NaiveDate,
        latest: NaiveDate,
    },

    /// The addressed serial number has no events.
    #[error("serial not found: {0}")]
    NotFound(String),

    /// Two reads of the same serial disagreed. Indicates a defect, never user input.
    #[error("consistency violation: {0}")]
    Consistency(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn ordering(attempted: NaiveDate, latest: NaiveDate) -> Self {
        Self::Ordering { attempted, latest }
    }

    pub fn not_found(serial: impl Into<String>) -> Self {
        Self::NotFound(serial.into())
    }

    pub fn consistency(msg: impl Into<String>) -> Self {
        Self::Consistency(msg.into())
    }

    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "validation_error",
            DomainError::Ordering { .. } => "ordering_error",
            DomainError::NotFound(_) => "not_found",
            DomainError::Consistency(_) => "consistency_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_message_names_both_dates() {
        let err = DomainError::ordering(
            NaiveDate::from_ymd_opt(2023, 1, 5).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 10).unwrap(),
        );
        assert_eq!(
            err.to_string(),
            "event_date 2023-01-05 is before latest event date 2023-01-10"
        );
        assert_eq!(err.code(), "ordering_error");
    }

    #[test]
    fn not_found_carries_serial() {
        let err = DomainError::not_found("AB-100");
        assert_eq!(err.to_string(), "serial not found: AB-100");
        assert_eq!(err, DomainError::NotFound("AB-100".to_string()));
    }
}
