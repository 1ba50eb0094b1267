//! Lifecycle events recorded against asset serial numbers.
//!
//! Pure data and rules: what an event looks like before and after it is stored,
//! how raw input is validated, and how events of one serial are ordered.

pub mod draft;
pub mod event;
pub mod ordering;
pub mod status;

pub use draft::{EventDraft, UncommittedEvent, parse_event_date};
pub use event::AssetEvent;
pub use ordering::{check_chronology, latest_of, order_key, sort_catalog, sort_history};
