//! In-memory implementations of the store traits.
//!
//! These are primarily for testing. They have the same semantics as the
//! SQLite ledger and filesystem blob store but keep everything in memory with
//! no persistence.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use consent_vault_core::{BlobHandle, LedgerEntry, TransactionId};

use crate::error::Result;
use crate::traits::{BlobStore, LedgerStore};

/// In-memory ledger.
///
/// All data is lost when the ledger is dropped. Thread-safe via RwLock.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: RwLock<Vec<LedgerEntry>>,
}

impl MemoryLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn append(&self, entry: &LedgerEntry) -> Result<u64> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.push(entry.clone());
        Ok(entries.len() as u64)
    }

    async fn read_all(&self) -> Result<Vec<LedgerEntry>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.clone())
    }

    async fn entries_for(&self, transaction_id: &TransactionId) -> Result<Vec<LedgerEntry>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries
            .iter()
            .filter(|e| &e.transaction_id == transaction_id)
            .cloned()
            .collect())
    }

    async fn len(&self) -> Result<u64> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.len() as u64)
    }
}

/// In-memory blob store.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<BlobHandle, Vec<u8>>>,
}

impl MemoryBlobStore {
    /// Create a new empty blob store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, handle: &BlobHandle, bytes: &[u8]) -> Result<()> {
        let mut blobs = self.blobs.write().unwrap_or_else(PoisonError::into_inner);
        blobs.insert(handle.clone(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, handle: &BlobHandle) -> Result<Option<Vec<u8>>> {
        let blobs = self.blobs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(blobs.get(handle).cloned())
    }

    async fn delete(&self, handle: &BlobHandle) -> Result<bool> {
        let mut blobs = self.blobs.write().unwrap_or_else(PoisonError::into_inner);
        Ok(blobs.remove(handle).is_some())
    }
}
