//! SQLite implementation of the ledger.
//!
//! This is the durable ledger backend. It uses rusqlite with bundled SQLite,
//! wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection};

use consent_vault_core::{now_millis, LedgerEntry, TransactionId};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::LedgerStore;

/// SQLite-backed ledger.
///
/// Thread-safe via internal Mutex; the single connection serializes appends,
/// which gives the ledger its total order. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteLedger {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLedger {
    /// Open a SQLite ledger at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA synchronous = FULL;")?;
        migration::migrate(&mut conn)?;
        tracing::info!(path = %path.display(), "ledger opened");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite ledger.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(format!("ledger connection: {}", e)))?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

fn encode_entry(entry: &LedgerEntry) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(entry, &mut buf)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

fn decode_entry(seq: i64, bytes: &[u8]) -> Result<LedgerEntry> {
    ciborium::from_reader(bytes)
        .map_err(|e| StoreError::Serialization(format!("ledger entry {}: {}", seq, e)))
}

fn collect_entries(rows: Vec<(i64, Vec<u8>)>) -> Result<Vec<LedgerEntry>> {
    rows.iter()
        .map(|(seq, bytes)| decode_entry(*seq, bytes))
        .collect()
}

#[async_trait]
impl LedgerStore for SqliteLedger {
    async fn append(&self, entry: &LedgerEntry) -> Result<u64> {
        let encoded = encode_entry(entry)?;
        let tx_id = entry.transaction_id;
        let kind = entry.kind();
        let timestamp = entry.timestamp;

        let seq = self
            .with_conn(move |conn| {
                conn.execute(
                    "INSERT INTO ledger_entries (transaction_id, kind, timestamp, entry, appended_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        tx_id.as_bytes().as_slice(),
                        kind,
                        timestamp,
                        encoded,
                        now_millis()
                    ],
                )?;
                Ok(conn.last_insert_rowid() as u64)
            })
            .await?;

        tracing::debug!(seq, tx = %entry.transaction_id, kind = entry.kind(), "ledger append");
        Ok(seq)
    }

    async fn read_all(&self) -> Result<Vec<LedgerEntry>> {
        let rows = self
            .with_conn(|conn| {
                let mut stmt = conn.prepare("SELECT seq, entry FROM ledger_entries ORDER BY seq")?;
                let rows = stmt
                    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<rusqlite::Result<Vec<(i64, Vec<u8>)>>>()?;
                Ok(rows)
            })
            .await?;

        collect_entries(rows)
    }

    async fn entries_for(&self, transaction_id: &TransactionId) -> Result<Vec<LedgerEntry>> {
        let tx_id = *transaction_id;

        let rows = self
            .with_conn(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT seq, entry FROM ledger_entries
                     WHERE transaction_id = ?1
                     ORDER BY seq",
                )?;
                let rows = stmt
                    .query_map(params![tx_id.as_bytes().as_slice()], |row| {
                        Ok((row.get(0)?, row.get(1)?))
                    })?
                    .collect::<rusqlite::Result<Vec<(i64, Vec<u8>)>>>()?;
                Ok(rows)
            })
            .await?;

        collect_entries(rows)
    }

    async fn len(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM ledger_entries", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }
}
