//! # Consent Vault Permissions
//!
//! Consent state, the access-control gate, and at-rest encryption.
//!
//! ## Overview
//!
//! Access is expressed as consent grants between a patient and a provider.
//! Each grant or revoke supersedes the previous entry for the same pair; the
//! live [`ConsentRegistry`] keeps only the latest entry while history lives
//! in the ledger.
//!
//! The [`AccessGate`] is the single policy checkpoint. Every path that writes
//! or discloses a record asks the gate first, and the gate answers from the
//! registry alone. Anything other than an active grant is a deny.
//!
//! ## Encryption Model
//!
//! Records are encrypted with ChaCha20-Poly1305 under one key held by the
//! [`Cipher`] for the lifetime of the process. Each encryption draws a fresh
//! random IV. The key is never persisted, so records written before a
//! restart cannot be decrypted after it.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use consent_vault_core::{PatientId, ProviderId, TransactionId};
//! use consent_vault_perms::{AccessGate, Cipher, ConsentRegistry};
//!
//! let registry = Arc::new(ConsentRegistry::new());
//! let gate = AccessGate::new(Arc::clone(&registry));
//! let patient = PatientId::new("pat-1").unwrap();
//! let provider = ProviderId::new("doc-1").unwrap();
//!
//! assert!(!gate.check(&patient, &provider).is_allowed());
//! registry.grant(&patient, &provider, TransactionId::generate(), 0);
//! assert!(gate.check(&patient, &provider).is_allowed());
//!
//! let cipher = Cipher::generate();
//! let (iv, ciphertext) = cipher.encrypt(b"hello").unwrap();
//! assert_eq!(cipher.decrypt(&ciphertext, &iv).unwrap(), b"hello");
//! ```

pub mod crypto;
pub mod envelope;
pub mod error;
pub mod gate;
pub mod grant;
pub mod state;

pub use crypto::{Cipher, EncryptionKey, Iv};
pub use envelope::{EncryptedBlob, EncryptionFormat};
pub use error::{CipherError, PermsError, Result};
pub use gate::{AccessDecision, AccessGate};
pub use grant::{ConsentGrant, ConsentKey};
pub use state::ConsentRegistry;
