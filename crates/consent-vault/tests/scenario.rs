//! End-to-end behaviour of the vault's operation surface.

use consent_vault::{AuditAction, LedgerEvent, MemoryVault, RecordUpload, VaultError};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[tokio::test]
async fn test_consent_lifecycle_scenario() -> anyhow::Result<()> {
    init_tracing();
    let vault = MemoryVault::in_memory();

    // No grant yet
    let denied = vault.add_record("pat-1", "doc-1", b"early").await;
    assert!(matches!(denied, Err(VaultError::AccessDenied { .. })));

    let (tx1, _) = vault.grant_consent("pat-1", "doc-1").await?;
    assert!(vault.is_active("pat-1", "doc-1"));

    let (r1, add_tx) = vault.add_record("pat-1", "doc-1", b"hello").await?;
    assert_eq!(vault.decrypt_record(&r1.record_id, "doc-1").await?, b"hello");

    let (tx2, _) = vault.revoke_consent("pat-1", "doc-1").await?;
    assert!(matches!(
        vault.decrypt_record(&r1.record_id, "doc-1").await,
        Err(VaultError::AccessDenied { .. })
    ));

    let ledger = vault.read_ledger().await?;
    let kinds: Vec<_> = ledger.iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        vec!["grant_consent", "add_record", "decrypt_record", "revoke_consent"]
    );
    assert_eq!(ledger[0].transaction_id, tx1);
    assert_eq!(ledger[1].transaction_id, add_tx);
    assert_eq!(ledger[3].transaction_id, tx2);

    let actions: Vec<_> = vault.read_audit().iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::GrantConsent,
            AuditAction::AddRecord,
            AuditAction::DecryptRecord,
            AuditAction::RevokeConsent,
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_every_success_writes_one_pair() -> anyhow::Result<()> {
    let vault = MemoryVault::in_memory();

    let (grant_tx, _) = vault.grant_consent("pat-1", "doc-1").await?;
    let (record, add_tx) = vault.add_record("pat-1", "doc-1", b"data").await?;
    let (_, list_tx) = vault.list_records("pat-1", "doc-1").await?;
    vault.decrypt_record(&record.record_id, "doc-1").await?;
    let (revoke_tx, _) = vault.revoke_consent("pat-1", "doc-1").await?;

    let ledger = vault.read_ledger().await?;
    let audit = vault.read_audit();
    assert_eq!(ledger.len(), 5);
    assert_eq!(audit.len(), 5);

    for (entry, audit_entry) in ledger.iter().zip(&audit) {
        assert_eq!(&entry.audit_entry(), audit_entry);
    }
    for tx in [grant_tx, add_tx, list_tx, revoke_tx] {
        assert_eq!(vault.ledger_entries_for(&tx).await?.len(), 1);
        assert_eq!(vault.audit_entries_for(&tx).len(), 1);
    }
    Ok(())
}

#[tokio::test]
async fn test_failures_write_nothing() -> anyhow::Result<()> {
    let vault = MemoryVault::in_memory();

    assert!(vault.add_record("pat-1", "doc-1", b"x").await.is_err());
    assert!(vault.list_records("pat-1", "doc-1").await.is_err());
    assert!(vault.grant_consent("", "doc-1").await.is_err());
    assert!(matches!(
        vault
            .decrypt_record(&consent_vault::RecordId::generate(), "doc-1")
            .await,
        Err(VaultError::NotFound(_))
    ));

    vault.grant_consent("pat-1", "doc-1").await?;
    assert!(matches!(
        vault.add_record("pat-1", "doc-1", b"").await,
        Err(VaultError::InvalidArgument(_))
    ));

    assert_eq!(vault.read_ledger().await?.len(), 1);
    assert_eq!(vault.read_audit().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_revocation_is_per_pair() -> anyhow::Result<()> {
    let vault = MemoryVault::in_memory();
    vault.grant_consent("pat-1", "doc-1").await?;
    vault.grant_consent("pat-1", "doc-2").await?;

    let (record, _) = vault.add_record("pat-1", "doc-1", b"scan").await?;
    vault.revoke_consent("pat-1", "doc-1").await?;

    assert!(matches!(
        vault.decrypt_record(&record.record_id, "doc-1").await,
        Err(VaultError::AccessDenied { .. })
    ));

    // The record persists and stays visible to the provider still consented
    let (records, _) = vault.list_records("pat-1", "doc-2").await?;
    assert_eq!(records, vec![record.clone()]);
    assert_eq!(vault.decrypt_record(&record.record_id, "doc-2").await?, b"scan");
    Ok(())
}

#[tokio::test]
async fn test_repeated_uploads_get_distinct_ids() -> anyhow::Result<()> {
    let vault = MemoryVault::in_memory();
    vault.grant_consent("pat-1", "doc-1").await?;

    let (a, _) = vault.add_record("pat-1", "doc-1", b"same").await?;
    let (b, _) = vault.add_record("pat-1", "doc-1", b"same").await?;

    assert_ne!(a.record_id, b.record_id);
    assert_ne!(a.blob_handle, b.blob_handle);
    assert_ne!(a.iv, b.iv);
    Ok(())
}

#[tokio::test]
async fn test_upload_metadata_reaches_the_ledger() -> anyhow::Result<()> {
    let vault = MemoryVault::in_memory();
    vault.grant_consent("pat-1", "doc-1").await?;

    let upload = RecordUpload::new(b"%PDF-1.7".to_vec())
        .with_file_name("labs.pdf")
        .with_content_type("application/pdf");
    let (record, tx) = vault.add_record_with("pat-1", "doc-1", upload).await?;

    let entries = vault.ledger_entries_for(&tx).await?;
    match &entries[0].event {
        LedgerEvent::RecordAdded { record: logged } => {
            assert_eq!(logged, &record);
            assert_eq!(logged.file_name.as_deref(), Some("labs.pdf"));
            assert_eq!(logged.content_type.as_deref(), Some("application/pdf"));
        }
        other => panic!("unexpected event: {:?}", other),
    }
    Ok(())
}
