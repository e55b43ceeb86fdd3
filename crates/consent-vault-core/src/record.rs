//! Record metadata and the directory entries it refers to.

use serde::{Deserialize, Serialize};

use crate::types::{BlobHandle, PatientId, ProviderId, RecordId};

/// Length in bytes of a record's initialization vector.
pub const IV_LEN: usize = 12;

/// A patient known to the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
}

impl Patient {
    pub fn new(id: PatientId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A provider known to the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,
    pub name: String,
}

impl Provider {
    pub fn new(id: ProviderId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Metadata of an encrypted record.
///
/// Never carries plaintext or ciphertext; the ciphertext lives in the blob
/// store under `blob_handle`. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedRecord {
    /// The record's identifier.
    pub record_id: RecordId,

    /// The patient the record belongs to.
    pub patient_id: PatientId,

    /// The provider that uploaded the record.
    pub provider_id: ProviderId,

    /// Where the ciphertext lives.
    pub blob_handle: BlobHandle,

    /// Initialization vector used for this record's encryption.
    pub iv: [u8; IV_LEN],

    /// Original file name, if the upload carried one.
    pub file_name: Option<String>,

    /// Media type, if the upload carried one.
    pub content_type: Option<String>,

    /// Plaintext size in bytes.
    pub size: u64,

    /// When the record was created (Unix ms).
    pub created_at: i64,
}

impl EncryptedRecord {
    /// Whether this record belongs to the given patient.
    pub fn belongs_to(&self, patient_id: &PatientId) -> bool {
        &self.patient_id == patient_id
    }
}
