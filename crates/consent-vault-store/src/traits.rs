//! Store traits: the abstract interfaces for ledger and blob persistence.
//!
//! These traits keep the vault storage-agnostic. Implementations include
//! SQLite and the filesystem (durable) and in-memory (for tests).

use async_trait::async_trait;
use consent_vault_core::{BlobHandle, LedgerEntry, TransactionId};

use crate::error::Result;

/// Append-only, replayable log of ledger entries.
///
/// # Design Notes
///
/// - **Atomic appends**: an append either becomes durable as a whole or not
///   at all.
/// - **Total order**: appends are serialized; the sequence number returned by
///   [`append`](LedgerStore::append) is strictly increasing.
/// - **No mutation**: there is no update, delete or compaction.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Durably append one entry.
    ///
    /// Returns the entry's position in the ledger (1-based).
    async fn append(&self, entry: &LedgerEntry) -> Result<u64>;

    /// Every entry ever appended, in append order, read from storage.
    async fn read_all(&self) -> Result<Vec<LedgerEntry>>;

    /// Entries written by one transaction, in append order.
    async fn entries_for(&self, transaction_id: &TransactionId) -> Result<Vec<LedgerEntry>>;

    /// Number of entries in the ledger.
    async fn len(&self) -> Result<u64>;
}

/// Storage for encrypted record blobs, keyed by handle.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a blob. Overwrites any blob under the same handle.
    async fn put(&self, handle: &BlobHandle, bytes: &[u8]) -> Result<()>;

    /// Fetch a blob. `None` if nothing is stored under the handle.
    async fn get(&self, handle: &BlobHandle) -> Result<Option<Vec<u8>>>;

    /// Remove a blob. Returns whether a blob was removed.
    ///
    /// Only used to roll back an upload whose ledger append failed.
    async fn delete(&self, handle: &BlobHandle) -> Result<bool>;
}
