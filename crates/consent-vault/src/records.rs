//! The record store.
//!
//! Holds encrypted record metadata and moves ciphertext in and out of the
//! blob store. Every path that writes or discloses a record asks the
//! [`AccessGate`] first.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use consent_vault_core::{
    now_millis, BlobHandle, EncryptedRecord, LedgerEntry, LedgerEvent, PatientId, ProviderId,
    RecordId, TransactionId,
};
use consent_vault_perms::{AccessGate, Cipher, CipherError, EncryptedBlob};
use consent_vault_store::{BlobStore, LedgerStore};

use crate::error::{Result, VaultError};
use crate::journal::Journal;

/// Payload and optional metadata for a record upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordUpload {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl RecordUpload {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: None,
            content_type: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Record metadata, indexed by id and by patient.
#[derive(Debug, Default)]
struct RecordIndex {
    by_id: HashMap<RecordId, EncryptedRecord>,
    /// Record ids per patient, in creation order.
    by_patient: HashMap<PatientId, Vec<RecordId>>,
}

impl RecordIndex {
    fn insert(&mut self, record: EncryptedRecord) {
        if self.by_id.contains_key(&record.record_id) {
            return;
        }
        self.by_patient
            .entry(record.patient_id.clone())
            .or_default()
            .push(record.record_id);
        self.by_id.insert(record.record_id, record);
    }

    fn for_patient(&self, patient_id: &PatientId) -> Vec<EncryptedRecord> {
        self.by_patient
            .get(patient_id)
            .map(|ids| ids.iter().filter_map(|id| self.by_id.get(id).cloned()).collect())
            .unwrap_or_default()
    }
}

/// Gated access to encrypted records.
pub struct RecordStore<L: LedgerStore, B: BlobStore> {
    gate: AccessGate,
    journal: Arc<Journal<L>>,
    blobs: Arc<B>,
    cipher: Cipher,
    index: RwLock<RecordIndex>,
}

impl<L: LedgerStore, B: BlobStore> RecordStore<L, B> {
    pub fn new(gate: AccessGate, journal: Arc<Journal<L>>, blobs: Arc<B>, cipher: Cipher) -> Self {
        Self {
            gate,
            journal,
            blobs,
            cipher,
            index: RwLock::new(RecordIndex::default()),
        }
    }

    /// Encrypt and store a new record for `patient_id`, uploaded by
    /// `provider_id`.
    ///
    /// The blob is written before the ledger entry, and consent is checked
    /// again under the journal lock before the record is committed. If that
    /// check or the ledger append fails the blob is removed again, so a
    /// failed upload leaves no metadata, no audit entry, and no ciphertext.
    pub async fn add(
        &self,
        patient_id: &PatientId,
        provider_id: &ProviderId,
        upload: RecordUpload,
    ) -> Result<(EncryptedRecord, TransactionId)> {
        if upload.bytes.is_empty() {
            return Err(VaultError::InvalidArgument("record data is required".into()));
        }
        self.gate.require(patient_id, provider_id)?;

        let record_id = RecordId::generate();
        let blob_handle = BlobHandle::for_record(&record_id);
        let sealed =
            EncryptedBlob::seal(&upload.bytes, &self.cipher).map_err(VaultError::EncryptionFailed)?;
        let encoded = sealed.to_bytes().map_err(VaultError::EncryptionFailed)?;

        self.blobs
            .put(&blob_handle, &encoded)
            .await
            .map_err(VaultError::Blob)?;

        let record = EncryptedRecord {
            record_id,
            patient_id: patient_id.clone(),
            provider_id: provider_id.clone(),
            blob_handle: blob_handle.clone(),
            iv: sealed.iv.0,
            file_name: upload.file_name,
            content_type: upload.content_type,
            size: upload.bytes.len() as u64,
            created_at: now_millis(),
        };

        let event = LedgerEvent::RecordAdded {
            record: record.clone(),
        };
        let committed = self
            .journal
            .commit_if(
                || self.require_consent(patient_id, provider_id),
                event,
                |_| self.insert(record.clone()),
            )
            .await;

        match committed {
            Ok((entry, ())) => {
                tracing::debug!(
                    patient = %patient_id,
                    provider = %provider_id,
                    record = %record_id,
                    tx = %entry.transaction_id,
                    size = record.size,
                    "record added"
                );
                Ok((record, entry.transaction_id))
            }
            Err(e) => {
                if let Err(cleanup) = self.blobs.delete(&blob_handle).await {
                    tracing::warn!(
                        record = %record_id,
                        error = %cleanup,
                        "failed to remove blob of uncommitted record"
                    );
                } else {
                    tracing::warn!(record = %record_id, "removed blob of uncommitted record");
                }
                Err(e)
            }
        }
    }

    /// All of `patient_id`'s records, in creation order.
    ///
    /// Any provider with active consent from the patient sees every record
    /// of that patient, whoever uploaded it.
    pub async fn list(
        &self,
        patient_id: &PatientId,
        provider_id: &ProviderId,
    ) -> Result<(Vec<EncryptedRecord>, TransactionId)> {
        self.gate.require(patient_id, provider_id)?;

        let records = self.read_index().for_patient(patient_id);
        let event = LedgerEvent::RecordsListed {
            patient_id: patient_id.clone(),
            provider_id: provider_id.clone(),
            record_count: records.len() as u64,
        };
        let (entry, ()) = self
            .journal
            .commit_if(|| self.require_consent(patient_id, provider_id), event, |_| ())
            .await?;

        tracing::debug!(
            patient = %patient_id,
            provider = %provider_id,
            count = records.len(),
            tx = %entry.transaction_id,
            "records listed"
        );
        Ok((records, entry.transaction_id))
    }

    /// Decrypt a record for `provider_id`.
    ///
    /// Access is judged against consent as it stands now, not as it stood at
    /// upload.
    pub async fn decrypt(
        &self,
        record_id: &RecordId,
        provider_id: &ProviderId,
    ) -> Result<(Vec<u8>, TransactionId)> {
        let record = self
            .get(record_id)
            .ok_or(VaultError::NotFound(*record_id))?;
        self.gate.require(&record.patient_id, provider_id)?;

        let Some(encoded) = self
            .blobs
            .get(&record.blob_handle)
            .await
            .map_err(VaultError::Blob)?
        else {
            tracing::warn!(record = %record_id, blob = %record.blob_handle, "ciphertext missing");
            return Err(VaultError::StorageMissing(record.blob_handle));
        };

        let plaintext = self.open(&record, &encoded).map_err(|e| {
            tracing::warn!(record = %record_id, error = %e, "decryption failed");
            VaultError::DecryptionFailed(e)
        })?;

        let event = LedgerEvent::RecordDecrypted {
            record_id: *record_id,
            patient_id: record.patient_id.clone(),
            provider_id: provider_id.clone(),
        };
        // Consent may have been revoked while the blob was being read
        let (entry, ()) = self
            .journal
            .commit_if(
                || self.require_consent(&record.patient_id, provider_id),
                event,
                |_| (),
            )
            .await?;

        tracing::debug!(
            patient = %record.patient_id,
            provider = %provider_id,
            record = %record_id,
            tx = %entry.transaction_id,
            "record decrypted"
        );
        Ok((plaintext, entry.transaction_id))
    }

    fn open(&self, record: &EncryptedRecord, encoded: &[u8]) -> std::result::Result<Vec<u8>, CipherError> {
        let blob = EncryptedBlob::from_bytes(encoded)?;
        if blob.iv.0 != record.iv {
            return Err(CipherError::Decrypt(
                "stored IV does not match record metadata".into(),
            ));
        }
        blob.open(&self.cipher)
    }

    fn require_consent(&self, patient_id: &PatientId, provider_id: &ProviderId) -> Result<()> {
        self.gate.require(patient_id, provider_id)?;
        Ok(())
    }

    /// Replay one ledger entry into the metadata index.
    ///
    /// Returns `true` if the entry added a record.
    pub fn apply_ledger_entry(&self, entry: &LedgerEntry) -> bool {
        match &entry.event {
            LedgerEvent::RecordAdded { record } => {
                self.insert(record.clone());
                true
            }
            _ => false,
        }
    }

    /// Number of records known.
    pub fn len(&self) -> usize {
        self.read_index().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, record_id: &RecordId) -> Option<EncryptedRecord> {
        self.read_index().by_id.get(record_id).cloned()
    }

    fn insert(&self, record: EncryptedRecord) {
        self.index
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(record);
    }

    fn read_index(&self) -> std::sync::RwLockReadGuard<'_, RecordIndex> {
        self.index.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditTrail;
    use consent_vault_perms::ConsentRegistry;
    use consent_vault_store::{MemoryBlobStore, MemoryLedger};

    struct Harness {
        registry: Arc<ConsentRegistry>,
        ledger: Arc<MemoryLedger>,
        blobs: Arc<MemoryBlobStore>,
        store: RecordStore<MemoryLedger, MemoryBlobStore>,
    }

    fn harness() -> Harness {
        let registry = Arc::new(ConsentRegistry::new());
        let ledger = Arc::new(MemoryLedger::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let journal = Arc::new(Journal::new(Arc::clone(&ledger), Arc::new(AuditTrail::new())));
        let store = RecordStore::new(
            AccessGate::new(Arc::clone(&registry)),
            journal,
            Arc::clone(&blobs),
            Cipher::generate(),
        );
        Harness {
            registry,
            ledger,
            blobs,
            store,
        }
    }

    fn ids() -> (PatientId, ProviderId) {
        (PatientId::new("pat-1").unwrap(), ProviderId::new("doc-1").unwrap())
    }

    #[tokio::test]
    async fn test_add_requires_consent() {
        let h = harness();
        let (patient, provider) = ids();

        let result = h.store.add(&patient, &provider, RecordUpload::new(b"x".to_vec())).await;

        assert!(matches!(result, Err(VaultError::AccessDenied { .. })));
        assert!(h.blobs.is_empty());
        assert!(h.ledger.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_upload_is_invalid() {
        let h = harness();
        let (patient, provider) = ids();
        h.registry.grant(&patient, &provider, TransactionId::generate(), 1);

        let result = h.store.add(&patient, &provider, RecordUpload::new(Vec::new())).await;
        assert!(matches!(result, Err(VaultError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_add_decrypt_roundtrip() {
        let h = harness();
        let (patient, provider) = ids();
        h.registry.grant(&patient, &provider, TransactionId::generate(), 1);

        let upload = RecordUpload::new(b"hello".to_vec())
            .with_file_name("scan.pdf")
            .with_content_type("application/pdf");
        let (record, _) = h.store.add(&patient, &provider, upload).await.unwrap();

        assert_eq!(record.size, 5);
        assert_eq!(record.file_name.as_deref(), Some("scan.pdf"));
        assert_eq!(record.blob_handle, BlobHandle::for_record(&record.record_id));

        let (plaintext, _) = h.store.decrypt(&record.record_id, &provider).await.unwrap();
        assert_eq!(plaintext, b"hello");
    }

    #[tokio::test]
    async fn test_unknown_record_is_not_found() {
        let h = harness();
        let (_, provider) = ids();
        let missing = RecordId::generate();

        let result = h.store.decrypt(&missing, &provider).await;
        assert!(matches!(result, Err(VaultError::NotFound(id)) if id == missing));
    }

    #[tokio::test]
    async fn test_missing_blob_is_storage_missing() {
        let h = harness();
        let (patient, provider) = ids();
        h.registry.grant(&patient, &provider, TransactionId::generate(), 1);

        let (record, _) = h
            .store
            .add(&patient, &provider, RecordUpload::new(b"data".to_vec()))
            .await
            .unwrap();
        h.blobs.delete(&record.blob_handle).await.unwrap();
        let before = h.ledger.len().await.unwrap();

        let result = h.store.decrypt(&record.record_id, &provider).await;
        assert!(matches!(result, Err(VaultError::StorageMissing(_))));
        assert_eq!(h.ledger.len().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_corrupt_blob_is_decryption_failure() {
        let h = harness();
        let (patient, provider) = ids();
        h.registry.grant(&patient, &provider, TransactionId::generate(), 1);

        let (record, _) = h
            .store
            .add(&patient, &provider, RecordUpload::new(b"data".to_vec()))
            .await
            .unwrap();
        h.blobs.put(&record.blob_handle, b"garbage").await.unwrap();

        let result = h.store.decrypt(&record.record_id, &provider).await;
        assert!(matches!(result, Err(VaultError::DecryptionFailed(_))));
    }

    #[tokio::test]
    async fn test_list_keeps_creation_order_and_ignores_uploader() {
        let h = harness();
        let patient = PatientId::new("pat-1").unwrap();
        let doc1 = ProviderId::new("doc-1").unwrap();
        let doc2 = ProviderId::new("doc-2").unwrap();
        h.registry.grant(&patient, &doc1, TransactionId::generate(), 1);
        h.registry.grant(&patient, &doc2, TransactionId::generate(), 2);

        let (first, _) = h
            .store
            .add(&patient, &doc1, RecordUpload::new(b"a".to_vec()))
            .await
            .unwrap();
        let (second, _) = h
            .store
            .add(&patient, &doc2, RecordUpload::new(b"b".to_vec()))
            .await
            .unwrap();

        let (listed, _) = h.store.list(&patient, &doc1).await.unwrap();
        assert_eq!(listed, vec![first, second]);
    }

    #[tokio::test]
    async fn test_replay_rebuilds_index() {
        let h = harness();
        let (patient, provider) = ids();
        h.registry.grant(&patient, &provider, TransactionId::generate(), 1);
        h.store
            .add(&patient, &provider, RecordUpload::new(b"a".to_vec()))
            .await
            .unwrap();

        let fresh = harness();
        for entry in h.ledger.read_all().await.unwrap() {
            fresh.store.apply_ledger_entry(&entry);
        }
        assert_eq!(fresh.store.len(), 1);
    }
}
