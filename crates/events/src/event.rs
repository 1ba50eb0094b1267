use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use assettrack_core::{EventId, SerialNumber};

use crate::draft::UncommittedEvent;

/// A stored lifecycle event (assigned an `event_id`).
///
/// Events are facts: once appended they are never mutated, and they are removed
/// only when every event of their serial is deleted together.
///
/// `created_at` records ingestion time for audit purposes. It never takes part in
/// ordering; see [`crate::ordering`] for the rule that does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEvent {
    pub event_id: EventId,
    pub serial_number: SerialNumber,
    pub event_date: NaiveDate,
    pub status: String,

    pub current_name: String,
    pub renamed_from: String,
    pub renamed_to: String,
    pub manufacture: String,
    pub model: String,
    pub description: String,

    pub created_at: DateTime<Utc>,
}

impl AssetEvent {
    /// Materialize a validated event with the identity the store assigned to it.
    pub fn from_uncommitted(
        event_id: EventId,
        created_at: DateTime<Utc>,
        event: UncommittedEvent,
    ) -> Self {
        Self {
            event_id,
            serial_number: event.serial_number,
            event_date: event.event_date,
            status: event.status,
            current_name: event.current_name,
            renamed_from: event.renamed_from,
            renamed_to: event.renamed_to,
            manufacture: event.manufacture,
            model: event.model,
            description: event.description,
            created_at,
        }
    }
}
