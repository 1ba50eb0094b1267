//! `assettrack-core`: domain foundation for asset lifecycle tracking.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the normalized serial number key, store-assigned event identifiers and the
//! error taxonomy shared by every layer above it.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{EventId, SerialNumber};
