//! Infrastructure layer: event storage backends and read-side projections.

pub mod event_store;
pub mod projections;

#[cfg(test)]
mod integration_tests;

pub use event_store::{
    EventStore, EventStoreError, InMemoryEventStore, PostgresEventStore, StreamSnapshot,
};
pub use projections::{CurrentState, FullView, StateProjector};
