//! # Consent Vault Testkit
//!
//! Testing utilities for the Consent Vault.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: temp-dir backed vaults that can be reopened to simulate a
//!   restart
//! - **Generators**: Proptest strategies for identifiers, payloads and
//!   sequences of consent changes
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use consent_vault_testkit::generators::{consent_ops, final_state};
//!
//! proptest! {
//!     #[test]
//!     fn last_change_wins(ops in consent_ops(16)) {
//!         // apply ops to a vault, then compare against final_state(&ops)
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use consent_vault_testkit::fixtures::TestFixture;
//!
//! async fn example() {
//!     let fixture = TestFixture::new().await;
//!     fixture.vault.grant_consent("pat-1", "doc-1").await.unwrap();
//!
//!     let fixture = fixture.reopen().await;
//!     assert!(fixture.vault.is_active("pat-1", "doc-1"));
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{consented_vault, TestFixture};
pub use generators::{consent_ops, final_state, ConsentOp};
