//! Well-known lifecycle status labels.
//!
//! The log treats status as an opaque string; these are the labels the
//! asset desk uses today. Any other non-blank label is accepted as-is.

pub const RENAMED: &str = "Renamed";
pub const REDEPLOY: &str = "Redeploy";
pub const DISPOSAL: &str = "Disposal";
pub const ASSIGNED: &str = "Assigned";
pub const RETURNED: &str = "Returned";

/// Every well-known label, in display order.
pub const KNOWN: [&str; 5] = [RENAMED, REDEPLOY, DISPOSAL, ASSIGNED, RETURNED];

/// Returns true when `status` is one of the well-known labels (exact match).
pub fn is_known(status: &str) -> bool {
    KNOWN.contains(&status)
}
