//! # Consent Vault Store
//!
//! Durable storage for the Consent Vault: the append-only ledger and the
//! per-record encrypted blobs.
//!
//! ## Overview
//!
//! Both concerns sit behind async traits so the vault is storage-agnostic.
//! The durable implementations are [`SqliteLedger`] and [`FsBlobStore`];
//! [`MemoryLedger`] and [`MemoryBlobStore`] have the same semantics without
//! persistence and are meant for tests.
//!
//! ## Key Types
//!
//! - [`LedgerStore`] - Append and replay ledger entries
//! - [`BlobStore`] - Put, get and delete encrypted blobs by handle
//! - [`SqliteLedger`] - SQLite-backed ledger
//! - [`FsBlobStore`] - One file per blob under a directory
//!
//! ## Usage
//!
//! ```rust,no_run
//! use consent_vault_store::{FsBlobStore, LedgerStore, SqliteLedger};
//!
//! async fn example() {
//!     let ledger = SqliteLedger::open("vault-data/ledger.db").unwrap();
//!     let _blobs = FsBlobStore::open("vault-data/blobs").unwrap();
//!
//!     for entry in ledger.read_all().await.unwrap() {
//!         println!("{} {}", entry.transaction_id, entry.kind());
//!     }
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Append-only**: the ledger table rejects `UPDATE` and `DELETE`.
//! - **Total order**: appends are serialized on one connection; `read_all`
//!   returns entries in the order they became durable.
//! - **Replay from disk**: `read_all` always reads storage, never a cache.

pub mod error;
pub mod fs;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use fs::FsBlobStore;
pub use memory::{MemoryBlobStore, MemoryLedger};
pub use sqlite::SqliteLedger;
pub use traits::{BlobStore, LedgerStore};
