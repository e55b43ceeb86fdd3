//! Consent grant entries.
//!
//! A grant is never edited. Granting or revoking writes a new entry for the
//! (patient, provider) pair which supersedes whatever was there before.

use serde::{Deserialize, Serialize};

use consent_vault_core::{PatientId, ProviderId, TransactionId};

/// The pair a consent entry applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConsentKey {
    pub patient_id: PatientId,
    pub provider_id: ProviderId,
}

impl ConsentKey {
    pub fn new(patient_id: &PatientId, provider_id: &ProviderId) -> Self {
        Self {
            patient_id: patient_id.clone(),
            provider_id: provider_id.clone(),
        }
    }
}

/// The authoritative consent entry for one pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentGrant {
    /// The patient giving or withdrawing consent.
    pub patient_id: PatientId,

    /// The provider the consent applies to.
    pub provider_id: ProviderId,

    /// `true` for a grant, `false` for a revoke.
    pub granted: bool,

    /// When this entry was written (Unix ms).
    pub timestamp: i64,

    /// The operation that wrote this entry.
    pub transaction_id: TransactionId,
}

impl ConsentGrant {
    /// Whether this entry grants access.
    pub fn is_active(&self) -> bool {
        self.granted
    }

    pub fn key(&self) -> ConsentKey {
        ConsentKey::new(&self.patient_id, &self.provider_id)
    }
}
