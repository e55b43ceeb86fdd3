//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;

use consent_vault_core::now_millis;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
        tracing::debug!(from = current, to = CURRENT_VERSION, "ledger schema migrated");
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Ledger: one row per privileged state change or disclosure
        CREATE TABLE ledger_entries (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,  -- total append order
            transaction_id BLOB NOT NULL,           -- 16 bytes, shared with the audit entry
            kind TEXT NOT NULL,                     -- event type, e.g. grant_consent
            timestamp INTEGER NOT NULL,             -- operation time (Unix ms)
            entry BLOB NOT NULL,                    -- CBOR-encoded LedgerEntry
            appended_at INTEGER NOT NULL            -- local time of the append
        );

        CREATE INDEX idx_ledger_transaction ON ledger_entries(transaction_id);
        CREATE INDEX idx_ledger_kind ON ledger_entries(kind);

        -- Append-only: existing rows can never change or disappear
        CREATE TRIGGER ledger_entries_no_update
        BEFORE UPDATE ON ledger_entries
        BEGIN
            SELECT RAISE(ABORT, 'ledger is append-only');
        END;

        CREATE TRIGGER ledger_entries_no_delete
        BEFORE DELETE ON ledger_entries
        BEGIN
            SELECT RAISE(ABORT, 'ledger is append-only');
        END;
        "#,
    )?;

    Ok(())
}
