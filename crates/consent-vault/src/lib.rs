//! # Consent Vault
//!
//! Consent-gated encrypted records with an audit trail and a durable ledger.
//!
//! ## Overview
//!
//! A patient grants or revokes a provider's right to their records. While a
//! grant is active the provider may upload records for the patient, list the
//! patient's records and decrypt them. Every successful grant, revoke,
//! upload, listing and decryption is written twice under one transaction id:
//! once to the in-memory audit trail and once to the durable ledger.
//!
//! - **Consent** lives in a registry keyed by (patient, provider); the latest
//!   entry for a pair wins.
//! - **Records** are sealed with ChaCha20-Poly1305 and stored as blobs; only
//!   metadata is kept in memory.
//! - **The ledger** is append-only and survives restart. With
//!   [`VaultConfig::replay_on_open`] it rebuilds consent and record metadata
//!   at startup.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use consent_vault::{MemoryVault, VaultError};
//!
//! async fn example() -> Result<(), VaultError> {
//!     let vault = MemoryVault::in_memory();
//!
//!     vault.grant_consent("pat-1", "doc-1").await?;
//!     let (record, _tx) = vault.add_record("pat-1", "doc-1", b"hello").await?;
//!
//!     let plaintext = vault.decrypt_record(&record.record_id, "doc-1").await?;
//!     assert_eq!(plaintext, b"hello");
//!
//!     vault.revoke_consent("pat-1", "doc-1").await?;
//!     assert!(vault.decrypt_record(&record.record_id, "doc-1").await.is_err());
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `consent_vault::core` - Identifiers, record metadata, ledger events
//! - `consent_vault::perms` - Consent registry, access gate, cipher
//! - `consent_vault::store` - Ledger and blob storage

pub mod audit;
pub mod config;
pub mod directory;
pub mod error;
pub mod journal;
pub mod records;
pub mod vault;

// Re-export component crates
pub use consent_vault_core as core;
pub use consent_vault_perms as perms;
pub use consent_vault_store as store;

pub use audit::AuditTrail;
pub use config::VaultConfig;
pub use directory::Directory;
pub use error::{Result, VaultError};
pub use journal::Journal;
pub use records::{RecordStore, RecordUpload};
pub use vault::{DiskVault, MemoryVault, Vault};

// Re-export commonly used types
pub use consent_vault_core::{
    AuditAction, AuditEntry, EncryptedRecord, LedgerEntry, LedgerEvent, Patient, PatientId,
    Provider, ProviderId, RecordId, TransactionId,
};
pub use consent_vault_perms::{AccessDecision, ConsentGrant};
