//! # Consent Vault Core
//!
//! Pure primitives for the Consent Vault: identifiers, record metadata,
//! audit entries and ledger entries.
//!
//! This crate contains no I/O, no storage, no cryptography beyond identifier
//! derivation. Everything here is plain data that the other crates move
//! around.
//!
//! ## Key Types
//!
//! - [`PatientId`] / [`ProviderId`] - Caller-asserted, non-empty identities
//! - [`RecordId`] - Identifier of an encrypted record
//! - [`TransactionId`] - Join key between an audit entry and its ledger entry
//! - [`BlobHandle`] - Opaque storage key for a record's ciphertext
//! - [`EncryptedRecord`] - Record metadata (never the plaintext)
//! - [`LedgerEntry`] / [`LedgerEvent`] - Durable, replayable events
//! - [`AuditEntry`] / [`AuditAction`] - In-memory mirror of privileged actions

pub mod error;
pub mod event;
pub mod record;
pub mod time;
pub mod types;

pub use error::{CoreError, Result};
pub use event::{AuditAction, AuditEntry, LedgerEntry, LedgerEvent};
pub use record::{EncryptedRecord, Patient, Provider};
pub use time::now_millis;
pub use types::{BlobHandle, PatientId, ProviderId, RecordId, TransactionId};
