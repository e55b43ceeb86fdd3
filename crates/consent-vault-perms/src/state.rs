//! Live consent state.
//!
//! The registry holds the latest consent entry per (patient, provider) pair.
//! History is not kept here; the ledger has it, and the registry can be
//! rebuilt by replaying ledger entries in order.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use consent_vault_core::{LedgerEntry, LedgerEvent, PatientId, ProviderId, TransactionId};

use crate::grant::{ConsentGrant, ConsentKey};

/// Authoritative mapping of (patient, provider) to current consent.
///
/// Thread-safe via RwLock. Lookups for different pairs never wait on each
/// other; a write holds the lock only for a single map insert.
#[derive(Debug, Default)]
pub struct ConsentRegistry {
    entries: RwLock<HashMap<ConsentKey, ConsentGrant>>,
}

impl ConsentRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an active grant for the pair, superseding any earlier entry.
    pub fn grant(
        &self,
        patient_id: &PatientId,
        provider_id: &ProviderId,
        transaction_id: TransactionId,
        timestamp: i64,
    ) -> ConsentGrant {
        self.write_entry(patient_id, provider_id, true, transaction_id, timestamp)
    }

    /// Record a revocation for the pair, superseding any earlier entry.
    pub fn revoke(
        &self,
        patient_id: &PatientId,
        provider_id: &ProviderId,
        transaction_id: TransactionId,
        timestamp: i64,
    ) -> ConsentGrant {
        self.write_entry(patient_id, provider_id, false, transaction_id, timestamp)
    }

    fn write_entry(
        &self,
        patient_id: &PatientId,
        provider_id: &ProviderId,
        granted: bool,
        transaction_id: TransactionId,
        timestamp: i64,
    ) -> ConsentGrant {
        let grant = ConsentGrant {
            patient_id: patient_id.clone(),
            provider_id: provider_id.clone(),
            granted,
            timestamp,
            transaction_id,
        };
        self.apply(grant.clone());
        grant
    }

    /// Make `grant` the authoritative entry for its pair.
    ///
    /// The caller has already made the change durable, so a poisoned lock is
    /// recovered rather than dropping the write.
    pub fn apply(&self, grant: ConsentGrant) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(grant.key(), grant);
    }

    /// Whether the latest entry for this exact pair is a grant.
    ///
    /// No entry, or an unreadable registry, means no access.
    pub fn is_active(&self, patient_id: &PatientId, provider_id: &ProviderId) -> bool {
        let Ok(entries) = self.entries.read() else {
            tracing::warn!("consent registry lock poisoned; denying");
            return false;
        };
        entries
            .get(&ConsentKey::new(patient_id, provider_id))
            .map(ConsentGrant::is_active)
            .unwrap_or(false)
    }

    /// The latest entry for a pair, granted or not.
    pub fn current(&self, patient_id: &PatientId, provider_id: &ProviderId) -> Option<ConsentGrant> {
        let entries = self.entries.read().ok()?;
        entries.get(&ConsentKey::new(patient_id, provider_id)).cloned()
    }

    /// Latest entries for every provider a patient has ever granted or
    /// revoked, ordered by provider id.
    pub fn grants_for_patient(&self, patient_id: &PatientId) -> Vec<ConsentGrant> {
        let Ok(entries) = self.entries.read() else {
            return Vec::new();
        };
        let mut grants: Vec<ConsentGrant> = entries
            .values()
            .filter(|g| &g.patient_id == patient_id)
            .cloned()
            .collect();
        grants.sort_by(|a, b| a.provider_id.cmp(&b.provider_id));
        grants
    }

    /// Replay one ledger entry.
    ///
    /// Returns `true` if the entry was a consent change. Other entries are
    /// ignored.
    pub fn apply_ledger_entry(&self, entry: &LedgerEntry) -> bool {
        match &entry.event {
            LedgerEvent::ConsentGranted {
                patient_id,
                provider_id,
            } => {
                self.grant(patient_id, provider_id, entry.transaction_id, entry.timestamp);
                true
            }
            LedgerEvent::ConsentRevoked {
                patient_id,
                provider_id,
            } => {
                self.revoke(patient_id, provider_id, entry.transaction_id, entry.timestamp);
                true
            }
            _ => false,
        }
    }

    /// Number of pairs with an entry.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
