use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use assettrack_core::{DomainError, SerialNumber};
use assettrack_events::{AssetEvent, EventDraft, UncommittedEvent, status};

/// Event store operation error.
///
/// Domain failures (validation, ordering, unknown serial, consistency) pass through
/// unchanged so callers can match on their kind. `Storage` covers everything the
/// backend itself can get wrong: connection loss, SQL errors, poisoned locks.
#[derive(Debug, Error)]
pub enum EventStoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl EventStoreError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// The domain error carried by this failure, if any.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            EventStoreError::Domain(e) => Some(e),
            EventStoreError::Storage(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, EventStoreError::Domain(DomainError::NotFound(_)))
    }

    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            EventStoreError::Domain(e) => e.code(),
            EventStoreError::Storage(_) => "store_error",
        }
    }
}

/// Latest event and ordered history of one serial, taken from a single read of
/// the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSnapshot {
    pub latest: AssetEvent,
    pub history: Vec<AssetEvent>,
}

/// Append-only lifecycle log keyed by serial number.
///
/// ## Append Semantics
///
/// `append()`:
/// - reads the serial's latest event and rejects the new one with
///   `DomainError::Ordering` if its `event_date` is earlier
/// - assigns a fresh, globally increasing `event_id` and a `created_at` timestamp
/// - persists exactly one event, or nothing at all on failure
///
/// The read-latest/compare/insert sequence must be serialized at least per serial,
/// so two concurrent appends can never both pass the check against a stale latest.
///
/// ## Read Semantics
///
/// Reads order events by `(event_date, event_id)`. Every per-serial read fails with
/// `DomainError::NotFound` when the serial has no events; a serial exists only
/// through its events.
///
/// `snapshot()` returns latest and history as one logical read: no append or
/// delete may land between the two. Separate `latest()` and `history()` calls
/// give no such guarantee.
///
/// ## Implementation Requirements
///
/// Implementations must:
/// - never mutate a stored event
/// - never reuse an `event_id`
/// - break same-day ties by `event_id` in both `latest` and `latest_per_serial`
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Append one validated event.
    async fn append(&self, event: UncommittedEvent) -> Result<AssetEvent, EventStoreError>;

    /// All events of a serial, oldest first.
    async fn history(&self, serial: &SerialNumber) -> Result<Vec<AssetEvent>, EventStoreError>;

    /// The most recent event of a serial.
    async fn latest(&self, serial: &SerialNumber) -> Result<AssetEvent, EventStoreError>;

    /// Latest event and full history of a serial, read together.
    async fn snapshot(&self, serial: &SerialNumber) -> Result<StreamSnapshot, EventStoreError>;

    /// The most recent event of every known serial, ordered by serial number
    /// (byte-wise, see [`assettrack_events::sort_catalog`]).
    async fn latest_per_serial(&self) -> Result<Vec<AssetEvent>, EventStoreError>;

    /// Remove every event of a serial; returns how many were removed.
    async fn delete_all(&self, serial: &SerialNumber) -> Result<u64, EventStoreError>;

    /// Number of events stored for a serial (0 when unknown).
    async fn count_events(&self, serial: &SerialNumber) -> Result<u64, EventStoreError>;

    /// Validate raw input, then append it.
    async fn append_draft(&self, draft: EventDraft) -> Result<AssetEvent, EventStoreError> {
        let event = draft.validate()?;
        if !status::is_known(&event.status) {
            debug!(status = %event.status, "appending event with unrecognized status label");
        }
        self.append(event).await
    }
}

#[async_trait]
impl<S> EventStore for Arc<S>
where
    S: EventStore + ?Sized,
{
    async fn append(&self, event: UncommittedEvent) -> Result<AssetEvent, EventStoreError> {
        (**self).append(event).await
    }

    async fn history(&self, serial: &SerialNumber) -> Result<Vec<AssetEvent>, EventStoreError> {
        (**self).history(serial).await
    }

    async fn latest(&self, serial: &SerialNumber) -> Result<AssetEvent, EventStoreError> {
        (**self).latest(serial).await
    }

    async fn snapshot(&self, serial: &SerialNumber) -> Result<StreamSnapshot, EventStoreError> {
        (**self).snapshot(serial).await
    }

    async fn latest_per_serial(&self) -> Result<Vec<AssetEvent>, EventStoreError> {
        (**self).latest_per_serial().await
    }

    async fn delete_all(&self, serial: &SerialNumber) -> Result<u64, EventStoreError> {
        (**self).delete_all(serial).await
    }

    async fn count_events(&self, serial: &SerialNumber) -> Result<u64, EventStoreError> {
        (**self).count_events(serial).await
    }
}
