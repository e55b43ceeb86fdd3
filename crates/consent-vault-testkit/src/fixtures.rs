//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use consent_vault::{DiskVault, MemoryVault, VaultConfig};
use tempfile::TempDir;

/// An on-disk vault in a temporary directory.
///
/// The directory is removed when the fixture is dropped.
pub struct TestFixture {
    pub dir: TempDir,
    pub config: VaultConfig,
    pub vault: DiskVault,
}

impl TestFixture {
    /// Open a fresh vault in a new temporary directory.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config = VaultConfig::new(dir.path());
        let vault = DiskVault::open(config.clone())
            .await
            .expect("open vault");
        Self { dir, config, vault }
    }

    /// Drop the vault and open it again over the same directory, as a
    /// process restart would.
    pub async fn reopen(self) -> Self {
        let Self { dir, config, vault } = self;
        drop(vault);
        let vault = DiskVault::open(config.clone())
            .await
            .expect("reopen vault");
        Self { dir, config, vault }
    }
}

/// An in-memory vault with consent already granted for each pair.
pub async fn consented_vault(pairs: &[(&str, &str)]) -> MemoryVault {
    let vault = MemoryVault::in_memory();
    for (patient, provider) in pairs {
        vault
            .grant_consent(patient, provider)
            .await
            .expect("grant consent");
    }
    vault
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixture_reopen_keeps_ledger() {
        let fixture = TestFixture::new().await;
        fixture.vault.grant_consent("pat-1", "doc-1").await.unwrap();

        let fixture = fixture.reopen().await;
        assert_eq!(fixture.vault.read_ledger().await.unwrap().len(), 1);
        assert!(fixture.vault.is_active("pat-1", "doc-1"));
    }

    #[tokio::test]
    async fn test_consented_vault() {
        let vault = consented_vault(&[("pat-1", "doc-1"), ("pat-2", "doc-1")]).await;

        assert!(vault.is_active("pat-1", "doc-1"));
        assert!(vault.is_active("pat-2", "doc-1"));
        assert!(!vault.is_active("pat-1", "doc-2"));
    }
}
