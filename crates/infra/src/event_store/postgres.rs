//! Postgres-backed event store implementation.
//!
//! This module persists the lifecycle log in the `computer_events` table (see
//! [`super::schema`]) and enforces the chronological-append rule inside one
//! transaction per append.
//!
//! ## Per-serial serialization
//!
//! `append()` takes `pg_advisory_xact_lock(hashtext(serial_number))` before reading
//! the serial's latest event. Two appends to the same serial therefore run their
//! read/compare/insert one after the other, while appends to different serials only
//! contend on the rare hash collision. The lock is released by commit or rollback.
//!
//! ## Error Mapping
//!
//! | Situation | EventStoreError |
//! |-----------|-----------------|
//! | New date earlier than latest | `Domain(Ordering)` |
//! | No rows for serial on read/delete | `Domain(NotFound)` |
//! | Any `sqlx::Error` | `Storage` (with the failing operation named) |
//! | Row that fails to decode | `Storage` |
//! | Stored serial that is not in normalized form | `Storage` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Row};
use tracing::{Span, info, instrument};

use assettrack_core::{DomainError, EventId, SerialNumber};
use assettrack_events::{AssetEvent, UncommittedEvent, check_chronology, sort_catalog};

use super::r#trait::{EventStore, EventStoreError, StreamSnapshot};
use super::schema;

/// Postgres-backed append-only event store.
///
/// ## Thread Safety
///
/// Uses the SQLx connection pool which is thread-safe (Arc + Send + Sync).
/// Appends run in a transaction. `snapshot` runs its two reads in one
/// `REPEATABLE READ` transaction; other reads are single statements.
#[derive(Debug, Clone)]
pub struct PostgresEventStore {
    pool: Arc<PgPool>,
}

impl PostgresEventStore {
    /// Create a new PostgresEventStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect to `database_url` and make sure the schema exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, EventStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        schema::ensure_schema(&pool).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    #[instrument(
        skip_all,
        fields(
            serial = %event.serial_number,
            event_date = %event.event_date,
            event_id = tracing::field::Empty
        ),
        err
    )]
    async fn append(&self, event: UncommittedEvent) -> Result<AssetEvent, EventStoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(event.serial_number.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("lock_serial", e))?;

        let latest: Option<NaiveDate> = sqlx::query_scalar(
            r#"
            SELECT event_date
            FROM computer_events
            WHERE serial_number = $1
            ORDER BY event_date DESC, event_id DESC
            LIMIT 1
            "#,
        )
        .bind(event.serial_number.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("read_latest", e))?;

        if let Err(e) = check_chronology(latest, event.event_date) {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(e.into());
        }

        let row = sqlx::query(
            r#"
            INSERT INTO computer_events (
                serial_number,
                current_name,
                renamed_from,
                renamed_to,
                event_date,
                status,
                manufacture,
                model,
                description
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING event_id, created_at
            "#,
        )
        .bind(event.serial_number.as_str())
        .bind(&event.current_name)
        .bind(&event.renamed_from)
        .bind(&event.renamed_to)
        .bind(event.event_date)
        .bind(&event.status)
        .bind(&event.manufacture)
        .bind(&event.model)
        .bind(&event.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_event", e))?;

        let event_id: i64 = row
            .try_get("event_id")
            .map_err(|e| map_sqlx_error("read_event_id", e))?;
        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| map_sqlx_error("read_created_at", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Span::current().record("event_id", event_id);
        info!("event appended");
        Ok(AssetEvent::from_uncommitted(
            EventId::new(event_id as u64),
            created_at,
            event,
        ))
    }

    #[instrument(skip_all, fields(serial = %serial, event_count = tracing::field::Empty), err)]
    async fn history(&self, serial: &SerialNumber) -> Result<Vec<AssetEvent>, EventStoreError> {
        let rows = sqlx::query(&format!(
            "{SELECT_EVENT} WHERE serial_number = $1 ORDER BY event_date ASC, event_id ASC"
        ))
        .bind(serial.as_str())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("history", e))?;

        if rows.is_empty() {
            return Err(DomainError::not_found(serial.as_str()).into());
        }
        Span::current().record("event_count", rows.len());
        decode_rows(&rows)
    }

    #[instrument(skip_all, fields(serial = %serial), err)]
    async fn latest(&self, serial: &SerialNumber) -> Result<AssetEvent, EventStoreError> {
        let row = sqlx::query(&format!(
            "{SELECT_EVENT} WHERE serial_number = $1 ORDER BY event_date DESC, event_id DESC LIMIT 1"
        ))
        .bind(serial.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("latest", e))?;

        match row {
            Some(row) => decode_row(&row),
            None => Err(DomainError::not_found(serial.as_str()).into()),
        }
    }

    #[instrument(skip_all, fields(serial = %serial, event_count = tracing::field::Empty), err)]
    async fn snapshot(&self, serial: &SerialNumber) -> Result<StreamSnapshot, EventStoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        // Both reads below see the same database snapshot.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("set_isolation", e))?;

        let latest = sqlx::query(&format!(
            "{SELECT_EVENT} WHERE serial_number = $1 ORDER BY event_date DESC, event_id DESC LIMIT 1"
        ))
        .bind(serial.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("snapshot_latest", e))?;

        let Some(latest) = latest else {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(DomainError::not_found(serial.as_str()).into());
        };

        let rows = sqlx::query(&format!(
            "{SELECT_EVENT} WHERE serial_number = $1 ORDER BY event_date ASC, event_id ASC"
        ))
        .bind(serial.as_str())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("snapshot_history", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Span::current().record("event_count", rows.len());
        Ok(StreamSnapshot {
            latest: decode_row(&latest)?,
            history: decode_rows(&rows)?,
        })
    }

    #[instrument(skip_all, fields(serial_count = tracing::field::Empty), err)]
    async fn latest_per_serial(&self) -> Result<Vec<AssetEvent>, EventStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT ON (serial_number)
                event_id,
                serial_number,
                current_name,
                renamed_from,
                renamed_to,
                event_date,
                status,
                manufacture,
                model,
                description,
                created_at
            FROM computer_events
            ORDER BY serial_number, event_date DESC, event_id DESC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("latest_per_serial", e))?;

        Span::current().record("serial_count", rows.len());
        // Postgres orders serials by the database collation; catalog order is byte-wise.
        let mut latest = decode_rows(&rows)?;
        sort_catalog(&mut latest);
        Ok(latest)
    }

    #[instrument(skip_all, fields(serial = %serial), err)]
    async fn delete_all(&self, serial: &SerialNumber) -> Result<u64, EventStoreError> {
        let result = sqlx::query("DELETE FROM computer_events WHERE serial_number = $1")
            .bind(serial.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_all", e))?;

        match result.rows_affected() {
            0 => Err(DomainError::not_found(serial.as_str()).into()),
            deleted => {
                info!(deleted, "serial deleted");
                Ok(deleted)
            }
        }
    }

    #[instrument(skip_all, fields(serial = %serial), err)]
    async fn count_events(&self, serial: &SerialNumber) -> Result<u64, EventStoreError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM computer_events WHERE serial_number = $1")
                .bind(serial.as_str())
                .fetch_one(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("count_events", e))?;
        Ok(total as u64)
    }
}

const SELECT_EVENT: &str = r#"
    SELECT
        event_id,
        serial_number,
        current_name,
        renamed_from,
        renamed_to,
        event_date,
        status,
        manufacture,
        model,
        description,
        created_at
    FROM computer_events
"#;

/// Map SQLx errors to EventStoreError, naming the failing operation.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> EventStoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.into_owned()).unwrap_or_default();
            EventStoreError::storage(format!(
                "database error in {operation} ({code}): {}",
                db_err.message()
            ))
        }
        sqlx::Error::PoolClosed => {
            EventStoreError::storage(format!("connection pool closed in {operation}"))
        }
        _ => EventStoreError::storage(format!("sqlx error in {operation}: {err}")),
    }
}

fn decode_row(row: &PgRow) -> Result<AssetEvent, EventStoreError> {
    let decoded = AssetEventRow::from_row(row)
        .map_err(|e| EventStoreError::storage(format!("failed to decode event row: {e}")))?;
    decoded.try_into()
}

fn decode_rows(rows: &[PgRow]) -> Result<Vec<AssetEvent>, EventStoreError> {
    rows.iter().map(decode_row).collect()
}

// SQLx row types

#[derive(Debug)]
struct AssetEventRow {
    event_id: i64,
    serial_number: String,
    current_name: String,
    renamed_from: String,
    renamed_to: String,
    event_date: NaiveDate,
    status: String,
    manufacture: String,
    model: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for AssetEventRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(AssetEventRow {
            event_id: row.try_get("event_id")?,
            serial_number: row.try_get("serial_number")?,
            current_name: row.try_get("current_name")?,
            renamed_from: row.try_get("renamed_from")?,
            renamed_to: row.try_get("renamed_to")?,
            event_date: row.try_get("event_date")?,
            status: row.try_get("status")?,
            manufacture: row.try_get("manufacture")?,
            model: row.try_get("model")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFrom<AssetEventRow> for AssetEvent {
    type Error = EventStoreError;

    fn try_from(row: AssetEventRow) -> Result<Self, Self::Error> {
        // Rows written by another client may not be normalized. Such a row could never
        // be found by its own serial, so it is reported rather than rewritten.
        let serial_number = SerialNumber::parse(&row.serial_number).map_err(|e| {
            EventStoreError::storage(format!("stored serial {:?} is invalid: {e}", row.serial_number))
        })?;
        if serial_number.as_str() != row.serial_number {
            return Err(EventStoreError::storage(format!(
                "stored serial {:?} is not normalized (expected {:?})",
                row.serial_number,
                serial_number.as_str()
            )));
        }
        Ok(AssetEvent {
            event_id: EventId::new(row.event_id as u64),
            serial_number,
            event_date: row.event_date,
            status: row.status,
            current_name: row.current_name,
            renamed_from: row.renamed_from,
            renamed_to: row.renamed_to,
            manufacture: row.manufacture,
            model: row.model,
            description: row.description,
            created_at: row.created_at,
        })
    }
}
