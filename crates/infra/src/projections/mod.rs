//! Projection implementations (read models derived from the lifecycle log).
//!
//! Projections here hold no state of their own. They are recomputed from the
//! event store on every query, so there is nothing to rebuild or invalidate.

pub mod current_state;

pub use current_state::{CurrentState, FullView, StateProjector};
