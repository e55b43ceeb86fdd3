//! Error types for the vault.

use std::path::PathBuf;

use consent_vault_core::{BlobHandle, CoreError, PatientId, ProviderId, RecordId};
use consent_vault_perms::{CipherError, PermsError};
use consent_vault_store::StoreError;
use thiserror::Error;

/// Errors that can occur during vault operations.
///
/// None of these leave an audit or ledger entry behind: an operation either
/// commits both or fails with one of these.
#[derive(Debug, Error)]
pub enum VaultError {
    /// A required identifier or payload was missing or empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No active consent for the requested pair.
    #[error("access denied: provider {provider_id} has no active consent from patient {patient_id}")]
    AccessDenied {
        patient_id: PatientId,
        provider_id: ProviderId,
    },

    /// Unknown record id.
    #[error("record not found: {0}")]
    NotFound(RecordId),

    /// Metadata exists but the ciphertext blob is gone.
    #[error("ciphertext missing for blob {0}")]
    StorageMissing(BlobHandle),

    /// The blob could not be parsed or authenticated under the current key.
    #[error("decryption failed: {0}")]
    DecryptionFailed(CipherError),

    /// The plaintext could not be sealed.
    #[error("encryption failed: {0}")]
    EncryptionFailed(CipherError),

    /// The ledger append failed; the operation did not take effect.
    #[error("ledger error: {0}")]
    Ledger(StoreError),

    /// The blob store failed.
    #[error("blob store error: {0}")]
    Blob(StoreError),

    /// The vault's data directory could not be prepared.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl VaultError {
    /// Whether this is a policy deny rather than a fault.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, VaultError::AccessDenied { .. })
    }
}

impl From<CoreError> for VaultError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidArgument(msg) | CoreError::MalformedId(msg) => {
                VaultError::InvalidArgument(msg)
            }
        }
    }
}

impl From<PermsError> for VaultError {
    fn from(e: PermsError) -> Self {
        match e {
            PermsError::AccessDenied {
                patient_id,
                provider_id,
            } => VaultError::AccessDenied {
                patient_id,
                provider_id,
            },
            PermsError::Cipher(e) => VaultError::DecryptionFailed(e),
            PermsError::Core(e) => e.into(),
        }
    }
}

/// Result type for vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;
