//! Raw event input and its validated form.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use assettrack_core::{DomainError, DomainResult, SerialNumber};

/// Unvalidated input for one event, as received from a caller.
///
/// Every field defaults to an empty string so that a missing field and a blank
/// field are reported the same way by [`EventDraft::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventDraft {
    pub serial_number: String,
    pub event_date: String,
    pub status: String,
    pub current_name: String,
    pub renamed_from: String,
    pub renamed_to: String,
    pub manufacture: String,
    pub model: String,
    pub description: String,
}

/// An event that passed validation but has not been stored yet.
///
/// The store assigns `event_id` and `created_at` when it appends one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncommittedEvent {
    pub serial_number: SerialNumber,
    pub event_date: NaiveDate,
    pub status: String,
    pub current_name: String,
    pub renamed_from: String,
    pub renamed_to: String,
    pub manufacture: String,
    pub model: String,
    pub description: String,
}

impl EventDraft {
    /// Validate and normalize the draft.
    ///
    /// - the serial number is normalized (trim + uppercase) and must not be blank
    /// - every text field is trimmed and must not be blank
    /// - `event_date` must parse (see [`parse_event_date`])
    pub fn validate(self) -> DomainResult<UncommittedEvent> {
        let serial_number = SerialNumber::parse(&self.serial_number)?;

        let fields = [
            ("event_date", &self.event_date),
            ("status", &self.status),
            ("current_name", &self.current_name),
            ("renamed_from", &self.renamed_from),
            ("renamed_to", &self.renamed_to),
            ("manufacture", &self.manufacture),
            ("model", &self.model),
            ("description", &self.description),
        ];
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(DomainError::validation(format!(
                "missing required fields: {}; use \"N/A\" if not applicable",
                missing.join(", ")
            )));
        }

        let event_date = parse_event_date(&self.event_date)?;

        Ok(UncommittedEvent {
            serial_number,
            event_date,
            status: self.status.trim().to_string(),
            current_name: self.current_name.trim().to_string(),
            renamed_from: self.renamed_from.trim().to_string(),
            renamed_to: self.renamed_to.trim().to_string(),
            manufacture: self.manufacture.trim().to_string(),
            model: self.model.trim().to_string(),
            description: self.description.trim().to_string(),
        })
    }
}

/// Parse a caller-supplied event date.
///
/// Accepts `YYYY-MM-DD`. An RFC 3339 timestamp is also accepted and reduced to
/// the calendar date it carries (its own offset, not UTC).
pub fn parse_event_date(raw: &str) -> DomainResult<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.date_naive());
    }
    Err(DomainError::validation(format!(
        "invalid event_date {raw:?}, use YYYY-MM-DD"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_draft() -> EventDraft {
        EventDraft {
            serial_number: " ab-100 ".to_string(),
            event_date: "2023-01-10".to_string(),
            status: " Assigned ".to_string(),
            current_name: "LT-ACC-07".to_string(),
            renamed_from: "N/A".to_string(),
            renamed_to: "N/A".to_string(),
            manufacture: "Lenovo".to_string(),
            model: "T14".to_string(),
            description: "issued to accounting".to_string(),
        }
    }

    #[test]
    fn valid_draft_is_normalized() {
        let ev = full_draft().validate().unwrap();
        assert_eq!(ev.serial_number.as_str(), "AB-100");
        assert_eq!(ev.status, "Assigned");
        assert_eq!(ev.event_date, NaiveDate::from_ymd_opt(2023, 1, 10).unwrap());
        // "N/A" is an ordinary value.
        assert_eq!(ev.renamed_from, "N/A");
    }

    #[test]
    fn blank_fields_are_listed() {
        let draft = EventDraft {
            status: "  ".to_string(),
            model: String::new(),
            ..full_draft()
        };
        match draft.validate() {
            Err(DomainError::Validation(msg)) => {
                assert!(msg.contains("status"), "{msg}");
                assert!(msg.contains("model"), "{msg}");
                assert!(!msg.contains("manufacture"), "{msg}");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn blank_serial_is_rejected_before_fields() {
        let draft = EventDraft {
            serial_number: "   ".to_string(),
            ..EventDraft::default()
        };
        match draft.validate() {
            Err(DomainError::Validation(msg)) => assert!(msg.contains("serial_number")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_date_is_rejected() {
        for raw in ["2023-13-01", "2023-02-30", "yesterday", "10/01/2023"] {
            let draft = EventDraft {
                event_date: raw.to_string(),
                ..full_draft()
            };
            assert!(
                matches!(draft.validate(), Err(DomainError::Validation(_))),
                "{raw} should not parse"
            );
        }
    }

    #[test]
    fn timestamp_reduces_to_its_date() {
        let date = parse_event_date("2023-06-01T23:30:00+02:00").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
    }

    #[test]
    fn missing_json_fields_default_to_blank() {
        let draft: EventDraft =
            serde_json::from_str(r#"{"serial_number":"x1","event_date":"2024-01-01"}"#).unwrap();
        assert!(matches!(draft.validate(), Err(DomainError::Validation(_))));
    }
}
