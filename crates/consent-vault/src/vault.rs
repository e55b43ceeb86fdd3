//! The Vault: the operation surface of the consent vault.
//!
//! The Vault owns every piece of shared state (consent registry, record
//! metadata, audit trail, ledger handle) and wires them together. It is
//! created at startup and dropped at shutdown; nothing is global.

use std::sync::Arc;

use consent_vault_core::{
    AuditEntry, EncryptedRecord, LedgerEntry, LedgerEvent, Patient, PatientId, Provider,
    ProviderId, RecordId, TransactionId,
};
use consent_vault_perms::{AccessDecision, AccessGate, Cipher, ConsentGrant, ConsentRegistry};
use consent_vault_store::{
    BlobStore, FsBlobStore, LedgerStore, MemoryBlobStore, MemoryLedger, SqliteLedger,
};

use crate::audit::AuditTrail;
use crate::config::VaultConfig;
use crate::directory::Directory;
use crate::error::{Result, VaultError};
use crate::journal::Journal;
use crate::records::{RecordStore, RecordUpload};

/// A vault on disk: SQLite ledger and one file per blob.
pub type DiskVault = Vault<SqliteLedger, FsBlobStore>;

/// A vault with nothing on disk.
pub type MemoryVault = Vault<MemoryLedger, MemoryBlobStore>;

/// Consent-gated encrypted records with an audit trail and a durable ledger.
pub struct Vault<L: LedgerStore, B: BlobStore> {
    registry: Arc<ConsentRegistry>,
    gate: AccessGate,
    journal: Arc<Journal<L>>,
    records: RecordStore<L, B>,
    directory: Directory,
}

impl DiskVault {
    /// Open (creating if needed) a vault under `config.data_dir`.
    ///
    /// A fresh cipher key is generated on every open. Records that survive
    /// a restart through replay keep their metadata but can no longer be
    /// decrypted.
    pub async fn open(config: VaultConfig) -> Result<Self> {
        std::fs::create_dir_all(config.data_dir()).map_err(|source| VaultError::Io {
            path: config.data_dir.clone(),
            source,
        })?;

        let ledger = SqliteLedger::open(config.ledger_path()).map_err(VaultError::Ledger)?;
        let blobs = FsBlobStore::open(config.blob_path()).map_err(VaultError::Blob)?;
        let vault = Vault::new(ledger, blobs, Cipher::generate());

        if config.replay_on_open {
            vault.replay().await?;
        }

        tracing::info!(path = %config.data_dir.display(), "vault opened");
        Ok(vault)
    }
}

impl MemoryVault {
    pub fn in_memory() -> Self {
        Vault::new(MemoryLedger::new(), MemoryBlobStore::new(), Cipher::generate())
    }
}

impl<L: LedgerStore, B: BlobStore> Vault<L, B> {
    /// Assemble a vault from its stores and a cipher.
    pub fn new(ledger: L, blobs: B, cipher: Cipher) -> Self {
        let registry = Arc::new(ConsentRegistry::new());
        let gate = AccessGate::new(Arc::clone(&registry));
        let journal = Arc::new(Journal::new(Arc::new(ledger), Arc::new(AuditTrail::new())));
        let records = RecordStore::new(
            gate.clone(),
            Arc::clone(&journal),
            Arc::new(blobs),
            cipher,
        );

        Self {
            registry,
            gate,
            journal,
            records,
            directory: Directory::new(),
        }
    }

    /// Rebuild consent state and record metadata from the durable ledger.
    ///
    /// The audit trail is not rebuilt. Returns the number of entries read.
    pub async fn replay(&self) -> Result<usize> {
        let entries = self
            .journal
            .ledger()
            .read_all()
            .await
            .map_err(VaultError::Ledger)?;

        let mut consents = 0usize;
        let mut records = 0usize;
        for entry in &entries {
            if self.registry.apply_ledger_entry(entry) {
                consents += 1;
            } else if self.records.apply_ledger_entry(entry) {
                records += 1;
            }
        }

        tracing::info!(entries = entries.len(), consents, records, "ledger replayed");
        Ok(entries.len())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Consent Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Grant `provider` access to `patient`'s records.
    ///
    /// Supersedes any earlier entry for the pair. Returns the transaction id
    /// and commit timestamp.
    pub async fn grant_consent(&self, patient: &str, provider: &str) -> Result<(TransactionId, i64)> {
        self.change_consent(patient, provider, true).await
    }

    /// Revoke `provider`'s access to `patient`'s records.
    pub async fn revoke_consent(&self, patient: &str, provider: &str) -> Result<(TransactionId, i64)> {
        self.change_consent(patient, provider, false).await
    }

    async fn change_consent(
        &self,
        patient: &str,
        provider: &str,
        granted: bool,
    ) -> Result<(TransactionId, i64)> {
        let patient_id = PatientId::new(patient)?;
        let provider_id = ProviderId::new(provider)?;

        let event = if granted {
            LedgerEvent::ConsentGranted {
                patient_id: patient_id.clone(),
                provider_id: provider_id.clone(),
            }
        } else {
            LedgerEvent::ConsentRevoked {
                patient_id: patient_id.clone(),
                provider_id: provider_id.clone(),
            }
        };

        let (entry, _) = self
            .journal
            .commit(event, |entry| self.registry.apply_ledger_entry(entry))
            .await?;

        tracing::info!(
            patient = %patient_id,
            provider = %provider_id,
            granted,
            tx = %entry.transaction_id,
            "consent changed"
        );
        Ok((entry.transaction_id, entry.timestamp))
    }

    /// Whether `provider` currently has consent from `patient`.
    ///
    /// Malformed ids are never active.
    pub fn is_active(&self, patient: &str, provider: &str) -> bool {
        self.check(patient, provider).is_allowed()
    }

    /// The access gate's decision for the pair.
    pub fn check(&self, patient: &str, provider: &str) -> AccessDecision {
        match (PatientId::new(patient), ProviderId::new(provider)) {
            (Ok(patient_id), Ok(provider_id)) => self.gate.check(&patient_id, &provider_id),
            _ => AccessDecision::Deny,
        }
    }

    /// The latest consent entry for the pair, granted or revoked.
    pub fn consent_status(&self, patient: &str, provider: &str) -> Result<Option<ConsentGrant>> {
        let patient_id = PatientId::new(patient)?;
        let provider_id = ProviderId::new(provider)?;
        Ok(self.registry.current(&patient_id, &provider_id))
    }

    /// Latest consent entries for every provider `patient` has ever granted
    /// or revoked, ordered by provider.
    pub fn consents_for_patient(&self, patient: &str) -> Result<Vec<ConsentGrant>> {
        let patient_id = PatientId::new(patient)?;
        Ok(self.registry.grants_for_patient(&patient_id))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Record Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Encrypt and store `bytes` as a record of `patient`, uploaded by
    /// `provider`. Returns the metadata, never the ciphertext.
    pub async fn add_record(
        &self,
        patient: &str,
        provider: &str,
        bytes: &[u8],
    ) -> Result<(EncryptedRecord, TransactionId)> {
        self.add_record_with(patient, provider, RecordUpload::new(bytes))
            .await
    }

    /// [`add_record`](Self::add_record) with upload metadata.
    pub async fn add_record_with(
        &self,
        patient: &str,
        provider: &str,
        upload: RecordUpload,
    ) -> Result<(EncryptedRecord, TransactionId)> {
        let patient_id = PatientId::new(patient)?;
        let provider_id = ProviderId::new(provider)?;
        self.records.add(&patient_id, &provider_id, upload).await
    }

    /// Every record of `patient`, for a provider with active consent.
    pub async fn list_records(
        &self,
        patient: &str,
        provider: &str,
    ) -> Result<(Vec<EncryptedRecord>, TransactionId)> {
        let patient_id = PatientId::new(patient)?;
        let provider_id = ProviderId::new(provider)?;
        self.records.list(&patient_id, &provider_id).await
    }

    /// Decrypt a record for `provider`.
    pub async fn decrypt_record(&self, record_id: &RecordId, provider: &str) -> Result<Vec<u8>> {
        let provider_id = ProviderId::new(provider)?;
        let (plaintext, _) = self.records.decrypt(record_id, &provider_id).await?;
        Ok(plaintext)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Logs
    // ─────────────────────────────────────────────────────────────────────────

    /// The in-memory audit trail, in insertion order.
    pub fn read_audit(&self) -> Vec<AuditEntry> {
        self.journal.audit().read_all()
    }

    /// Every ledger entry, read back from durable storage in append order.
    pub async fn read_ledger(&self) -> Result<Vec<LedgerEntry>> {
        self.journal
            .ledger()
            .read_all()
            .await
            .map_err(VaultError::Ledger)
    }

    pub async fn ledger_entries_for(&self, transaction_id: &TransactionId) -> Result<Vec<LedgerEntry>> {
        self.journal
            .ledger()
            .entries_for(transaction_id)
            .await
            .map_err(VaultError::Ledger)
    }

    pub fn audit_entries_for(&self, transaction_id: &TransactionId) -> Vec<AuditEntry> {
        self.journal.audit().entries_for(transaction_id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Directory
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a patient. Returns `false` if the id is already taken.
    pub fn register_patient(&self, id: &str, name: &str) -> Result<bool> {
        Ok(self
            .directory
            .register_patient(Patient::new(PatientId::new(id)?, name)))
    }

    /// Register a provider. Returns `false` if the id is already taken.
    pub fn register_provider(&self, id: &str, name: &str) -> Result<bool> {
        Ok(self
            .directory
            .register_provider(Provider::new(ProviderId::new(id)?, name)))
    }

    pub fn patients(&self) -> Vec<Patient> {
        self.directory.patients()
    }

    pub fn providers(&self) -> Vec<Provider> {
        self.directory.providers()
    }
}
