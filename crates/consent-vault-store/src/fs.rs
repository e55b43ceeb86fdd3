//! Filesystem implementation of the blob store.
//!
//! One file per blob, named by its handle, under a single directory. Writes
//! go through a temporary file and a rename so a crash never leaves a
//! half-written blob under a live handle.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use consent_vault_core::BlobHandle;

use crate::error::{Result, StoreError};
use crate::traits::BlobStore;

const BLOB_EXTENSION: &str = "blob";

/// Blob store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Open (creating if needed) a blob directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        tracing::info!(path = %root.display(), "blob store opened");
        Ok(Self { root })
    }

    /// The directory blobs are stored in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `handle`.
    ///
    /// Handles are lowercase hex; anything else is refused so a handle can
    /// never name a path outside the root.
    pub fn path_for(&self, handle: &BlobHandle) -> Result<PathBuf> {
        let name = handle.as_str();
        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(StoreError::InvalidData(format!(
                "blob handle is not hex: {:?}",
                name
            )));
        }
        Ok(self.root.join(format!("{}.{}", name, BLOB_EXTENSION)))
    }

    async fn blocking<F, T>(f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        tokio::task::spawn_blocking(f)
            .await
            .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, handle: &BlobHandle, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(handle)?;
        let bytes = bytes.to_vec();
        Self::blocking(move || write_atomically(&path, &bytes)).await
    }

    async fn get(&self, handle: &BlobHandle) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(handle)?;
        Self::blocking(move || match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        })
        .await
    }

    async fn delete(&self, handle: &BlobHandle) -> Result<bool> {
        let path = self.path_for(handle)?;
        Self::blocking(move || match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        })
        .await
    }
}
