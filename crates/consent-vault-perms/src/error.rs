//! Error types for the permissions module.

use consent_vault_core::{PatientId, ProviderId};
use thiserror::Error;

/// Errors from the cipher and blob envelope.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encrypt(String),

    /// Authentication failed: wrong key, tampered ciphertext, or wrong IV.
    #[error("decryption failed: {0}")]
    Decrypt(String),

    /// The IV has the wrong length.
    #[error("malformed IV: expected {expected} bytes, got {got}")]
    MalformedIv { expected: usize, got: usize },

    /// The stored blob could not be parsed.
    #[error("malformed blob: {0}")]
    MalformedBlob(String),
}

/// Errors that can occur during permission operations.
#[derive(Debug, Error)]
pub enum PermsError {
    /// No active consent between the patient and the provider.
    #[error("access denied: provider {provider_id} has no active consent from patient {patient_id}")]
    AccessDenied {
        patient_id: PatientId,
        provider_id: ProviderId,
    },

    /// Cipher error.
    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),

    /// Core error.
    #[error("core error: {0}")]
    Core(#[from] consent_vault_core::CoreError),
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, PermsError>;
