//! Vault configuration.

use std::path::{Path, PathBuf};

/// Where an on-disk vault keeps its state, and how it starts up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultConfig {
    /// Root directory for the ledger and blobs.
    pub data_dir: PathBuf,
    /// Ledger database file name, relative to `data_dir`.
    pub ledger_file: PathBuf,
    /// Blob directory, relative to `data_dir`.
    pub blob_dir: PathBuf,
    /// Rebuild consent state and record metadata from the ledger on open.
    pub replay_on_open: bool,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./vault-data"),
            ledger_file: PathBuf::from("ledger.db"),
            blob_dir: PathBuf::from("blobs"),
            replay_on_open: true,
        }
    }
}

impl VaultConfig {
    /// Default layout rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_ledger_file(mut self, ledger_file: impl Into<PathBuf>) -> Self {
        self.ledger_file = ledger_file.into();
        self
    }

    pub fn with_blob_dir(mut self, blob_dir: impl Into<PathBuf>) -> Self {
        self.blob_dir = blob_dir.into();
        self
    }

    pub fn with_replay_on_open(mut self, replay_on_open: bool) -> Self {
        self.replay_on_open = replay_on_open;
        self
    }

    /// Full path of the ledger database.
    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join(&self.ledger_file)
    }

    /// Full path of the blob directory.
    pub fn blob_path(&self) -> PathBuf {
        self.data_dir.join(&self.blob_dir)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VaultConfig::default();
        assert_eq!(config.ledger_path(), PathBuf::from("./vault-data/ledger.db"));
        assert_eq!(config.blob_path(), PathBuf::from("./vault-data/blobs"));
        assert!(config.replay_on_open);
    }

    #[test]
    fn test_builder() {
        let config = VaultConfig::new("/tmp/vault")
            .with_ledger_file("events.db")
            .with_blob_dir("ciphertext")
            .with_replay_on_open(false);

        assert_eq!(config.ledger_path(), PathBuf::from("/tmp/vault/events.db"));
        assert_eq!(config.blob_path(), PathBuf::from("/tmp/vault/ciphertext"));
        assert!(!config.replay_on_open);
    }
}
