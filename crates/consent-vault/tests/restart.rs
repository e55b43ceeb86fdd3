//! Durability of the ledger across a restart.

use consent_vault::{DiskVault, VaultConfig, VaultError};

#[tokio::test]
async fn test_ledger_and_consent_survive_restart() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = VaultConfig::new(dir.path());

    let (record, before) = {
        let vault = DiskVault::open(config.clone()).await?;
        vault.grant_consent("pat-1", "doc-1").await?;
        vault.grant_consent("pat-1", "doc-2").await?;
        vault.revoke_consent("pat-1", "doc-2").await?;
        let (record, _) = vault.add_record("pat-1", "doc-1", b"hello").await?;
        (record, vault.read_ledger().await?)
    };

    let vault = DiskVault::open(config).await?;

    assert_eq!(vault.read_ledger().await?, before);
    assert!(vault.read_audit().is_empty());
    assert!(vault.is_active("pat-1", "doc-1"));
    assert!(!vault.is_active("pat-1", "doc-2"));

    let (records, _) = vault.list_records("pat-1", "doc-1").await?;
    assert_eq!(records, vec![record.clone()]);

    // The key did not survive, so the ciphertext is unreadable
    assert!(matches!(
        vault.decrypt_record(&record.record_id, "doc-1").await,
        Err(VaultError::DecryptionFailed(_))
    ));
    assert_eq!(vault.read_ledger().await?.len(), before.len() + 1);
    Ok(())
}

#[tokio::test]
async fn test_open_without_replay_starts_empty() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;

    {
        let vault = DiskVault::open(VaultConfig::new(dir.path())).await?;
        vault.grant_consent("pat-1", "doc-1").await?;
    }

    let vault = DiskVault::open(VaultConfig::new(dir.path()).with_replay_on_open(false)).await?;
    assert!(!vault.is_active("pat-1", "doc-1"));
    assert_eq!(vault.read_ledger().await?.len(), 1);

    assert_eq!(vault.replay().await?, 1);
    assert!(vault.is_active("pat-1", "doc-1"));
    Ok(())
}

#[tokio::test]
async fn test_custom_layout() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = VaultConfig::new(dir.path().join("nested"))
        .with_ledger_file("events.db")
        .with_blob_dir("ciphertext");

    let vault = DiskVault::open(config.clone()).await?;
    vault.grant_consent("pat-1", "doc-1").await?;
    vault.add_record("pat-1", "doc-1", b"x").await?;

    assert!(config.ledger_path().exists());
    assert_eq!(std::fs::read_dir(config.blob_path())?.count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_unusable_data_dir_is_an_io_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let occupied = dir.path().join("not-a-dir");
    std::fs::write(&occupied, b"file in the way")?;

    let result = DiskVault::open(VaultConfig::new(&occupied)).await;
    match result {
        Err(VaultError::Io { path, .. }) => assert_eq!(path, occupied),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("vault opened over a file"),
    }
    Ok(())
}
