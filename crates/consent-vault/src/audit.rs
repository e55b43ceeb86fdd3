//! The in-memory audit trail.
//!
//! A fast, queryable mirror of privileged actions for the life of the
//! process. The ledger is the durable source of truth; this is lost on
//! restart and is not rebuilt by replay.

use std::sync::{PoisonError, RwLock};

use consent_vault_core::{AuditEntry, TransactionId};

/// Append-only list of audit entries.
#[derive(Debug, Default)]
pub struct AuditTrail {
    entries: RwLock<Vec<AuditEntry>>,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry.
    pub fn record(&self, entry: AuditEntry) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.push(entry);
    }

    /// Every entry, in insertion order.
    pub fn read_all(&self) -> Vec<AuditEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Entries carrying `transaction_id`.
    pub fn entries_for(&self, transaction_id: &TransactionId) -> Vec<AuditEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| &e.transaction_id == transaction_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
