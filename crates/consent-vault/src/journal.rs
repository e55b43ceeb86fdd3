//! Paired audit + ledger commits.
//!
//! Every successful privileged operation produces exactly one ledger entry
//! and one audit entry under a fresh transaction id. [`Journal::commit`] is
//! the only place either is written.
//!
//! A commit holds the journal lock across these steps, in order:
//!
//! 1. run the caller's precheck, if any (the consent re-check),
//! 2. append the entry to the durable ledger,
//! 3. apply the in-memory state change,
//! 4. push the matching audit entry.
//!
//! If the append fails nothing else happens, so a state change is never
//! visible before it is durable and the two logs never disagree. Holding the
//! lock also gives the ledger, the audit trail and consent application one
//! shared total order.

use std::sync::Arc;

use tokio::sync::Mutex;

use consent_vault_core::{now_millis, LedgerEntry, LedgerEvent, TransactionId};
use consent_vault_store::LedgerStore;

use crate::audit::AuditTrail;
use crate::error::{Result, VaultError};

/// Serializes commits to the ledger and the audit trail.
pub struct Journal<L: LedgerStore> {
    ledger: Arc<L>,
    audit: Arc<AuditTrail>,
    lock: Mutex<()>,
}

impl<L: LedgerStore> Journal<L> {
    pub fn new(ledger: Arc<L>, audit: Arc<AuditTrail>) -> Self {
        Self {
            ledger,
            audit,
            lock: Mutex::new(()),
        }
    }

    /// Commit `event` under a new transaction id.
    ///
    /// `apply` runs after the ledger append succeeds and before the audit
    /// entry is pushed; it must not fail.
    pub async fn commit<T, F>(&self, event: LedgerEvent, apply: F) -> Result<(LedgerEntry, T)>
    where
        F: FnOnce(&LedgerEntry) -> T,
    {
        self.commit_if(|| Ok(()), event, apply).await
    }

    /// Like [`commit`](Self::commit), but `precheck` runs first, under the
    /// journal lock. If it fails nothing is written.
    ///
    /// Consent only changes inside a commit, so a consent check made here
    /// cannot be overtaken by a concurrent grant or revoke.
    pub async fn commit_if<T, P, F>(
        &self,
        precheck: P,
        event: LedgerEvent,
        apply: F,
    ) -> Result<(LedgerEntry, T)>
    where
        P: FnOnce() -> Result<()>,
        F: FnOnce(&LedgerEntry) -> T,
    {
        let _guard = self.lock.lock().await;
        precheck()?;

        let entry = LedgerEntry::new(TransactionId::generate(), now_millis(), event);
        let seq = self
            .ledger
            .append(&entry)
            .await
            .map_err(VaultError::Ledger)?;

        let applied = apply(&entry);
        self.audit.record(entry.audit_entry());

        tracing::debug!(seq, tx = %entry.transaction_id, kind = entry.kind(), "committed");
        Ok((entry, applied))
    }

    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    pub fn audit(&self) -> &Arc<AuditTrail> {
        &self.audit
    }
}
