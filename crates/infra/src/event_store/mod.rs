//! Append-only event store boundary.
//!
//! This module defines the storage abstraction for the lifecycle log together
//! with its two backends: an in-memory store for tests/dev and a Postgres store
//! for durable deployments.

pub mod in_memory;
pub mod postgres;
pub mod schema;
pub mod r#trait;

pub use in_memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;
pub use schema::ensure_schema;
pub use r#trait::{EventStore, EventStoreError, StreamSnapshot};
