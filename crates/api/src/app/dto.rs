use serde::{Deserialize, Serialize};

use assettrack_events::EventDraft;
use assettrack_infra::CurrentState;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /serials/:serial/event`. The serial comes from the path.
///
/// Absent and `null` fields both arrive as blank and are reported together by
/// validation.
#[derive(Debug, Default, Deserialize)]
pub struct AppendEventRequest {
    #[serde(default)]
    pub event_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub current_name: Option<String>,
    #[serde(default)]
    pub renamed_from: Option<String>,
    #[serde(default)]
    pub renamed_to: Option<String>,
    #[serde(default)]
    pub manufacture: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl AppendEventRequest {
    pub fn into_draft(self, serial: String) -> EventDraft {
        EventDraft {
            serial_number: serial,
            event_date: self.event_date.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            current_name: self.current_name.unwrap_or_default(),
            renamed_from: self.renamed_from.unwrap_or_default(),
            renamed_to: self.renamed_to.unwrap_or_default(),
            manufacture: self.manufacture.unwrap_or_default(),
            model: self.model.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub serials: Vec<CurrentState>,
}

#[derive(Debug, Serialize)]
pub struct AppendEventResponse {
    pub event_id: u64,
}

#[derive(Debug, Serialize)]
pub struct DeleteSerialResponse {
    pub message: String,
    pub deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_missing_fields_become_blank() {
        let body: AppendEventRequest = serde_json::from_value(serde_json::json!({
            "event_date": "2023-01-10",
            "status": null,
            "current_name": "LAP-07",
        }))
        .unwrap();

        let draft = body.into_draft("ab-100".to_string());
        assert_eq!(draft.serial_number, "ab-100");
        assert_eq!(draft.event_date, "2023-01-10");
        assert_eq!(draft.current_name, "LAP-07");
        assert!(draft.status.is_empty());
        assert!(draft.description.is_empty());
    }
}
