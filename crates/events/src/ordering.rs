//! Ordering rule for the events of one serial.
//!
//! History order is `(event_date ASC, event_id ASC)`. The latest event is the
//! maximum under that order, so two events on the same day are resolved by the
//! store-assigned id: the one appended later wins.

use chrono::NaiveDate;

use assettrack_core::{DomainError, DomainResult, EventId};

use crate::event::AssetEvent;

/// Sort key implementing the history order.
pub fn order_key(event: &AssetEvent) -> (NaiveDate, EventId) {
    (event.event_date, event.event_id)
}

/// Most recent event of a slice, or `None` when it is empty.
pub fn latest_of(events: &[AssetEvent]) -> Option<&AssetEvent> {
    events.iter().max_by_key(|e| order_key(e))
}

/// Sort events into history order (oldest first).
pub fn sort_history(events: &mut [AssetEvent]) {
    events.sort_by_key(order_key);
}

/// Sort latest-per-serial rows into catalog order: serial number, byte-wise.
///
/// Backends must not rely on a database collation here, so every store returns
/// the catalog in the same order.
pub fn sort_catalog(events: &mut [AssetEvent]) {
    events.sort_by(|a, b| a.serial_number.as_str().cmp(b.serial_number.as_str()));
}

/// Chronological-append check.
///
/// The first event of a serial (`latest == None`) is unconstrained; afterwards a
/// new date may equal but never precede the current latest date.
pub fn check_chronology(latest: Option<NaiveDate>, attempted: NaiveDate) -> DomainResult<()> {
    match latest {
        Some(latest) if attempted < latest => Err(DomainError::ordering(attempted, latest)),
        _ => Ok(()),
    }
}
