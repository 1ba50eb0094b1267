//! Durable schema for the lifecycle log.

use sqlx::PgPool;
use tracing::info;

use super::r#trait::EventStoreError;

/// Table holding every lifecycle event.
pub const EVENTS_TABLE: &str = "computer_events";

const CREATE_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS computer_events (
    event_id      BIGSERIAL PRIMARY KEY,
    serial_number TEXT        NOT NULL CHECK (serial_number <> ''),
    current_name  TEXT        NOT NULL,
    renamed_from  TEXT        NOT NULL,
    renamed_to    TEXT        NOT NULL,
    event_date    DATE        NOT NULL,
    status        TEXT        NOT NULL CHECK (status <> ''),
    manufacture   TEXT        NOT NULL,
    model         TEXT        NOT NULL,
    description   TEXT        NOT NULL,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

// Serves per-serial lookups, history order and DISTINCT ON latest-per-serial.
const CREATE_ORDER_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS computer_events_serial_order_idx
    ON computer_events (serial_number, event_date DESC, event_id DESC)
"#;

/// Create the events table and its index if they do not exist yet.
///
/// Idempotent; safe to run on every startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), EventStoreError> {
    for (step, ddl) in [
        ("create_events_table", CREATE_EVENTS_TABLE),
        ("create_order_index", CREATE_ORDER_INDEX),
    ] {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|e| EventStoreError::storage(format!("schema step {step} failed: {e}")))?;
    }
    info!(table = EVENTS_TABLE, "event schema ready");
    Ok(())
}
