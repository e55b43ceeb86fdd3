//! Encrypted blob envelope.
//!
//! The IV and ciphertext of a record are stored together as one blob. The
//! envelope is CBOR-encoded and carries a format tag so the algorithm can
//! change without guessing at old blobs.

use serde::{Deserialize, Serialize};

use crate::crypto::{Cipher, Iv};
use crate::error::CipherError;

/// Format identifier for encrypted blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum EncryptionFormat {
    /// ChaCha20-Poly1305 with 256-bit key.
    ChaCha20Poly1305 = 1,
}

/// An encrypted record blob as persisted by the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedBlob {
    /// Encryption algorithm used.
    pub format: EncryptionFormat,

    /// IV used for encryption (unique per encryption).
    pub iv: Iv,

    /// The encrypted data (includes authentication tag).
    pub ciphertext: Vec<u8>,
}

impl EncryptedBlob {
    /// Encrypt plaintext with the given cipher.
    pub fn seal(plaintext: &[u8], cipher: &Cipher) -> Result<Self, CipherError> {
        let (iv, ciphertext) = cipher.encrypt(plaintext)?;

        Ok(Self {
            format: EncryptionFormat::ChaCha20Poly1305,
            iv,
            ciphertext,
        })
    }

    /// Decrypt with the given cipher.
    pub fn open(&self, cipher: &Cipher) -> Result<Vec<u8>, CipherError> {
        match self.format {
            EncryptionFormat::ChaCha20Poly1305 => cipher.decrypt(&self.ciphertext, &self.iv),
        }
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CipherError> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| CipherError::Encrypt(format!("blob encoding: {e}")))?;
        Ok(buf)
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CipherError> {
        ciborium::from_reader(bytes).map_err(|e| CipherError::MalformedBlob(e.to_string()))
    }
}
