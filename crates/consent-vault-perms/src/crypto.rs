//! Symmetric encryption of record payloads.
//!
//! ChaCha20-Poly1305 with a 256-bit key and a 96-bit IV. The key is generated
//! once when the [`Cipher`] is created and only ever lives in memory.

use std::fmt;

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use consent_vault_core::record::IV_LEN;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::CipherError;

/// A 256-bit symmetric encryption key for ChaCha20-Poly1305.
#[derive(Clone)]
pub struct EncryptionKey([u8; 32]);

impl EncryptionKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    fn aead(&self) -> Result<ChaCha20Poly1305, CipherError> {
        ChaCha20Poly1305::new_from_slice(&self.0).map_err(|e| CipherError::Encrypt(e.to_string()))
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(..)")
    }
}

/// A 96-bit initialization vector. Never reused under the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Iv(pub [u8; IV_LEN]);

impl Iv {
    /// Draw a new random IV.
    pub fn generate() -> Self {
        let mut bytes = [0u8; IV_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; IV_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse from a slice, rejecting the wrong length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CipherError> {
        let arr: [u8; IV_LEN] = bytes.try_into().map_err(|_| CipherError::MalformedIv {
            expected: IV_LEN,
            got: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; IV_LEN] {
        &self.0
    }
}

/// Process-lifetime record cipher.
///
/// Holds the single key used for every record. Cheap to share behind an
/// `Arc`; encryption and decryption take `&self`.
pub struct Cipher {
    key: EncryptionKey,
}

impl Cipher {
    /// Create a cipher with a freshly generated key.
    pub fn generate() -> Self {
        Self::with_key(EncryptionKey::generate())
    }

    /// Create a cipher around an existing key.
    pub fn with_key(key: EncryptionKey) -> Self {
        Self { key }
    }

    /// Encrypt `plaintext` under a fresh random IV.
    ///
    /// Returns the IV and the ciphertext (which includes the 16-byte tag).
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<(Iv, Vec<u8>), CipherError> {
        let iv = Iv::generate();
        let ciphertext = self
            .key
            .aead()?
            .encrypt(Nonce::from_slice(iv.as_bytes()), plaintext)
            .map_err(|e| CipherError::Encrypt(e.to_string()))?;
        Ok((iv, ciphertext))
    }

    /// Decrypt `ciphertext` produced under `iv`.
    ///
    /// Fails with [`CipherError::Decrypt`] if the ciphertext was produced by
    /// another key, for example one from before a restart.
    pub fn decrypt(&self, ciphertext: &[u8], iv: &Iv) -> Result<Vec<u8>, CipherError> {
        self.key
            .aead()
            .map_err(|e| CipherError::Decrypt(e.to_string()))?
            .decrypt(Nonce::from_slice(iv.as_bytes()), ciphertext)
            .map_err(|e| CipherError::Decrypt(e.to_string()))
    }
}

impl fmt::Debug for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cipher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt() {
        let cipher = Cipher::generate();
        let plaintext = b"hello, world!";

        let (iv, ciphertext) = cipher.encrypt(plaintext).unwrap();
        assert_ne!(&ciphertext[..plaintext.len()], plaintext);

        let decrypted = cipher.decrypt(&ciphertext, &iv).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_fresh_iv_per_encryption() {
        let cipher = Cipher::generate();

        let (iv1, ct1) = cipher.encrypt(b"same").unwrap();
        let (iv2, ct2) = cipher.encrypt(b"same").unwrap();

        assert_ne!(iv1, iv2);
        assert_ne!(ct1, ct2);
    }

    #[test]
    fn test_decrypt_wrong_key_fails() {
        let cipher1 = Cipher::generate();
        let cipher2 = Cipher::generate();

        let (iv, ciphertext) = cipher1.encrypt(b"secret").unwrap();

        assert!(matches!(
            cipher2.decrypt(&ciphertext, &iv),
            Err(CipherError::Decrypt(_))
        ));
    }

    #[test]
    fn test_decrypt_wrong_iv_fails() {
        let cipher = Cipher::generate();
        let (_, ciphertext) = cipher.encrypt(b"secret").unwrap();

        assert!(cipher.decrypt(&ciphertext, &Iv::generate()).is_err());
    }

    #[test]
    fn test_decrypt_truncated_ciphertext_fails() {
        let cipher = Cipher::generate();
        let (iv, ciphertext) = cipher.encrypt(b"secret").unwrap();

        assert!(cipher.decrypt(&ciphertext[..4], &iv).is_err());
        assert!(cipher.decrypt(&[], &iv).is_err());
    }

    #[test]
    fn test_iv_from_slice_rejects_wrong_length() {
        assert_eq!(
            Iv::from_slice(&[0u8; 8]),
            Err(CipherError::MalformedIv {
                expected: IV_LEN,
                got: 8
            })
        );
        assert!(Iv::from_slice(&[7u8; IV_LEN]).is_ok());
    }

    #[test]
    fn test_debug_hides_key() {
        let key = EncryptionKey::from_bytes([0x42; 32]);
        assert_eq!(format!("{:?}", key), "EncryptionKey(..)");
    }

    proptest::proptest! {
        #[test]
        fn prop_roundtrip(plaintext in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..512)) {
            let cipher = Cipher::generate();
            let (iv, ciphertext) = cipher.encrypt(&plaintext).unwrap();
            proptest::prop_assert_eq!(cipher.decrypt(&ciphertext, &iv).unwrap(), plaintext);
        }
    }
}
