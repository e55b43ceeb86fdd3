//! Audit and ledger entries.
//!
//! Every privileged operation produces exactly one [`LedgerEntry`] and one
//! [`AuditEntry`] sharing a [`TransactionId`]. The audit entry is derived
//! from the ledger entry so the two can never disagree about who did what.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::EncryptedRecord;
use crate::types::{PatientId, ProviderId, RecordId, TransactionId};

/// A state change or disclosure recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A patient granted a provider access.
    ConsentGranted {
        patient_id: PatientId,
        provider_id: ProviderId,
    },

    /// A patient revoked a provider's access.
    ConsentRevoked {
        patient_id: PatientId,
        provider_id: ProviderId,
    },

    /// A provider uploaded a record.
    RecordAdded { record: EncryptedRecord },

    /// A provider listed a patient's records.
    RecordsListed {
        patient_id: PatientId,
        provider_id: ProviderId,
        record_count: u64,
    },

    /// A provider decrypted a record.
    RecordDecrypted {
        record_id: RecordId,
        patient_id: PatientId,
        provider_id: ProviderId,
    },
}

impl LedgerEvent {
    /// Stable name of the event type, used as the ledger `kind` column.
    pub fn kind(&self) -> &'static str {
        self.action().as_str()
    }

    /// The audit action this event corresponds to.
    pub fn action(&self) -> AuditAction {
        match self {
            LedgerEvent::ConsentGranted { .. } => AuditAction::GrantConsent,
            LedgerEvent::ConsentRevoked { .. } => AuditAction::RevokeConsent,
            LedgerEvent::RecordAdded { .. } => AuditAction::AddRecord,
            LedgerEvent::RecordsListed { .. } => AuditAction::ListRecords,
            LedgerEvent::RecordDecrypted { .. } => AuditAction::DecryptRecord,
        }
    }

    /// Who performed the action.
    ///
    /// Consent changes are performed by the patient; record operations by
    /// the provider.
    pub fn actor(&self) -> String {
        match self {
            LedgerEvent::ConsentGranted { patient_id, .. }
            | LedgerEvent::ConsentRevoked { patient_id, .. } => patient_id.to_string(),
            LedgerEvent::RecordAdded { record } => record.provider_id.to_string(),
            LedgerEvent::RecordsListed { provider_id, .. }
            | LedgerEvent::RecordDecrypted { provider_id, .. } => provider_id.to_string(),
        }
    }

    /// What the action was performed on.
    pub fn target(&self) -> String {
        match self {
            LedgerEvent::ConsentGranted { provider_id, .. }
            | LedgerEvent::ConsentRevoked { provider_id, .. } => provider_id.to_string(),
            LedgerEvent::RecordAdded { record } => record.record_id.to_string(),
            LedgerEvent::RecordsListed { patient_id, .. } => patient_id.to_string(),
            LedgerEvent::RecordDecrypted { record_id, .. } => record_id.to_string(),
        }
    }
}

/// One durable ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Transaction shared with the matching audit entry.
    pub transaction_id: TransactionId,

    /// When the operation was committed (Unix ms).
    pub timestamp: i64,

    /// What happened.
    pub event: LedgerEvent,
}

impl LedgerEntry {
    pub fn new(transaction_id: TransactionId, timestamp: i64, event: LedgerEvent) -> Self {
        Self {
            transaction_id,
            timestamp,
            event,
        }
    }

    /// Stable name of the event type.
    pub fn kind(&self) -> &'static str {
        self.event.kind()
    }

    /// Build the audit entry paired with this ledger entry.
    pub fn audit_entry(&self) -> AuditEntry {
        AuditEntry {
            transaction_id: self.transaction_id,
            action: self.event.action(),
            actor_id: self.event.actor(),
            target_id: self.event.target(),
            timestamp: self.timestamp,
        }
    }
}

/// Kind of privileged action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    GrantConsent,
    RevokeConsent,
    AddRecord,
    ListRecords,
    DecryptRecord,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::GrantConsent => "grant_consent",
            AuditAction::RevokeConsent => "revoke_consent",
            AuditAction::AddRecord => "add_record",
            AuditAction::ListRecords => "list_records",
            AuditAction::DecryptRecord => "decrypt_record",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the in-memory audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub transaction_id: TransactionId,
    pub action: AuditAction,
    pub actor_id: String,
    pub target_id: String,
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> PatientId {
        PatientId::new("pat-1").unwrap()
    }

    fn provider() -> ProviderId {
        ProviderId::new("doc-1").unwrap()
    }

    #[test]
    fn test_audit_entry_mirrors_ledger_entry() {
        let tx = TransactionId::generate();
        let entry = LedgerEntry::new(
            tx,
            1_700_000_000_000,
            LedgerEvent::ConsentGranted {
                patient_id: patient(),
                provider_id: provider(),
            },
        );

        let audit = entry.audit_entry();
        assert_eq!(audit.transaction_id, tx);
        assert_eq!(audit.action, AuditAction::GrantConsent);
        assert_eq!(audit.actor_id, "pat-1");
        assert_eq!(audit.target_id, "doc-1");
        assert_eq!(audit.timestamp, entry.timestamp);
    }

    #[test]
    fn test_decrypt_event_targets_record() {
        let record_id = RecordId::from_bytes([0xab; 16]);
        let event = LedgerEvent::RecordDecrypted {
            record_id,
            patient_id: patient(),
            provider_id: provider(),
        };

        assert_eq!(event.kind(), "decrypt_record");
        assert_eq!(event.actor(), "doc-1");
        assert_eq!(event.target(), record_id.to_hex());
    }

    #[test]
    fn test_ledger_entry_json_shape() {
        let entry = LedgerEntry::new(
            TransactionId::from_bytes([0x01; 16]),
            42,
            LedgerEvent::ConsentRevoked {
                patient_id: patient(),
                provider_id: provider(),
            },
        );

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["event"]["consent_revoked"]["patient_id"], "pat-1");
        assert_eq!(value["event"]["consent_revoked"]["provider_id"], "doc-1");
        assert_eq!(value["timestamp"], 42);
    }

    #[test]
    fn test_ledger_entry_cbor_roundtrip() {
        let entry = LedgerEntry::new(
            TransactionId::generate(),
            7,
            LedgerEvent::RecordsListed {
                patient_id: patient(),
                provider_id: provider(),
                record_count: 3,
            },
        );

        let mut buf = Vec::new();
        ciborium::into_writer(&entry, &mut buf).unwrap();
        let recovered: LedgerEntry = ciborium::from_reader(&buf[..]).unwrap();
        assert_eq!(entry, recovered);
    }
}
