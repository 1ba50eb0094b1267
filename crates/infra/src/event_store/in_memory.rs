use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use assettrack_core::{DomainError, EventId, SerialNumber};
use assettrack_events::{AssetEvent, UncommittedEvent, check_chronology, latest_of, sort_history};

use super::r#trait::{EventStore, EventStoreError, StreamSnapshot};

#[derive(Debug, Default)]
struct Log {
    /// Events per serial, in append order.
    streams: BTreeMap<SerialNumber, Vec<AssetEvent>>,
    /// Last assigned id; ids are global across serials and never reused.
    last_event_id: u64,
}

/// In-memory append-only event store.
///
/// Intended for tests/dev. One `RwLock` guards the whole log, so the
/// check-and-insert of every append runs under the write lock and appends are
/// serialized across all serials.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    log: RwLock<Log>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> EventStoreError {
        EventStoreError::storage("lock poisoned")
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, event: UncommittedEvent) -> Result<AssetEvent, EventStoreError> {
        let mut log = self.log.write().map_err(|_| Self::poisoned())?;

        let latest_date = log
            .streams
            .get(&event.serial_number)
            .and_then(|stream| latest_of(stream))
            .map(|e| e.event_date);
        check_chronology(latest_date, event.event_date)?;

        log.last_event_id += 1;
        let stored = AssetEvent::from_uncommitted(EventId::new(log.last_event_id), Utc::now(), event);
        log.streams
            .entry(stored.serial_number.clone())
            .or_default()
            .push(stored.clone());

        Ok(stored)
    }

    async fn history(&self, serial: &SerialNumber) -> Result<Vec<AssetEvent>, EventStoreError> {
        let log = self.log.read().map_err(|_| Self::poisoned())?;
        let mut events = log
            .streams
            .get(serial)
            .filter(|stream| !stream.is_empty())
            .cloned()
            .ok_or_else(|| DomainError::not_found(serial.as_str()))?;
        sort_history(&mut events);
        Ok(events)
    }

    async fn latest(&self, serial: &SerialNumber) -> Result<AssetEvent, EventStoreError> {
        let log = self.log.read().map_err(|_| Self::poisoned())?;
        log.streams
            .get(serial)
            .and_then(|stream| latest_of(stream))
            .cloned()
            .ok_or_else(|| DomainError::not_found(serial.as_str()).into())
    }

    async fn snapshot(&self, serial: &SerialNumber) -> Result<StreamSnapshot, EventStoreError> {
        // One read guard for both, so no writer can interleave.
        let log = self.log.read().map_err(|_| Self::poisoned())?;
        let stream = log
            .streams
            .get(serial)
            .ok_or_else(|| DomainError::not_found(serial.as_str()))?;
        let latest = latest_of(stream)
            .cloned()
            .ok_or_else(|| DomainError::not_found(serial.as_str()))?;
        let mut history = stream.clone();
        sort_history(&mut history);
        Ok(StreamSnapshot { latest, history })
    }

    async fn latest_per_serial(&self) -> Result<Vec<AssetEvent>, EventStoreError> {
        let log = self.log.read().map_err(|_| Self::poisoned())?;
        // BTreeMap iteration is already in serial order.
        Ok(log
            .streams
            .values()
            .filter_map(|stream| latest_of(stream).cloned())
            .collect())
    }

    async fn delete_all(&self, serial: &SerialNumber) -> Result<u64, EventStoreError> {
        let mut log = self.log.write().map_err(|_| Self::poisoned())?;
        match log.streams.remove(serial) {
            Some(stream) if !stream.is_empty() => Ok(stream.len() as u64),
            _ => Err(DomainError::not_found(serial.as_str()).into()),
        }
    }

    async fn count_events(&self, serial: &SerialNumber) -> Result<u64, EventStoreError> {
        let log = self.log.read().map_err(|_| Self::poisoned())?;
        Ok(log.streams.get(serial).map_or(0, |stream| stream.len() as u64))
    }
}
