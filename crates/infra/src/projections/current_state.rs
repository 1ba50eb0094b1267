use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::error;

use assettrack_core::{DomainError, SerialNumber};
use assettrack_events::AssetEvent;

use crate::event_store::{EventStore, EventStoreError, StreamSnapshot};

/// Queryable current state of one asset: the fields of its latest event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentState {
    pub serial_number: SerialNumber,
    pub current_name: String,
    pub current_status: String,
    pub last_event_date: NaiveDate,
    pub manufacture: String,
    pub model: String,
    pub description: String,
}

impl From<&AssetEvent> for CurrentState {
    fn from(event: &AssetEvent) -> Self {
        Self {
            serial_number: event.serial_number.clone(),
            current_name: event.current_name.clone(),
            current_status: event.status.clone(),
            last_event_date: event.event_date,
            manufacture: event.manufacture.clone(),
            model: event.model.clone(),
            description: event.description.clone(),
        }
    }
}

/// Current state plus the full ordered history of one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullView {
    pub current_state: CurrentState,
    pub history: Vec<AssetEvent>,
    pub total_events: usize,
}

/// Read-only projection over an [`EventStore`].
///
/// Nothing is cached: every call re-derives its answer from the stored log, so
/// the projection can never drift from the events it summarizes.
#[derive(Debug, Clone)]
pub struct StateProjector<S> {
    store: S,
}

impl<S> StateProjector<S>
where
    S: EventStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current state of one serial; `NotFound` propagates unchanged.
    pub async fn current_state(&self, serial: &SerialNumber) -> Result<CurrentState, EventStoreError> {
        let latest = self.store.latest(serial).await?;
        Ok(CurrentState::from(&latest))
    }

    /// Current state, ordered history and event count of one serial.
    ///
    /// Latest and history come from one store snapshot, so a concurrent append
    /// or delete is either fully visible or not at all. A snapshot whose latest
    /// is not the last entry of its own history is a store defect and fails with
    /// `DomainError::Consistency`.
    pub async fn full_view(&self, serial: &SerialNumber) -> Result<FullView, EventStoreError> {
        let StreamSnapshot { latest, history } = self.store.snapshot(serial).await?;

        match history.last() {
            None => {
                return Err(inconsistent(serial, "latest event exists but history is empty"));
            }
            Some(last) if last.event_id != latest.event_id => {
                return Err(inconsistent(
                    serial,
                    &format!(
                        "latest event {} is not the last history entry {}",
                        latest.event_id, last.event_id
                    ),
                ));
            }
            Some(_) => {}
        }

        Ok(FullView {
            current_state: CurrentState::from(&latest),
            total_events: history.len(),
            history,
        })
    }

    /// One current-state row per known serial, in serial order.
    pub async fn catalog(&self) -> Result<Vec<CurrentState>, EventStoreError> {
        let latest = self.store.latest_per_serial().await?;
        Ok(latest.iter().map(CurrentState::from).collect())
    }
}

fn inconsistent(serial: &SerialNumber, detail: &str) -> EventStoreError {
    error!(serial = %serial, detail, "event store consistency violation");
    DomainError::consistency(format!("{serial}: {detail}")).into()
}
