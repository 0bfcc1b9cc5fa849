//! Blob store implementations.
//!
//! The pipeline treats the blob store as an external collaborator behind the
//! `BlobStore` trait. Two implementations are provided: a filesystem store
//! for self-hosted deployments and a read-only HTTP fetcher for sources
//! addressed by URL.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use docdex_core::{new_v7, BlobStore, Error, Result};

/// Generate a sharded storage path for a new blob.
///
/// Path format: `blobs/{owner}/{first-2-hex}/{next-2-hex}/{uuid}.bin`.
/// The original filename lives on the document record; the locator stays
/// opaque.
pub fn generate_storage_path(owner_id: Uuid, blob_id: Uuid) -> String {
    let hex = blob_id.as_hyphenated().to_string().replace('-', "");
    format!(
        "blobs/{}/{}/{}/{}.bin",
        owner_id.as_hyphenated(),
        &hex[0..2],
        &hex[2..4],
        blob_id.as_hyphenated()
    )
}

/// Filesystem blob store.
///
/// Writes are atomic (temp file + rename) so a crash never leaves a
/// partially written blob behind a valid locator.
pub struct FilesystemBlobStore {
    base_path: PathBuf,
}

impl FilesystemBlobStore {
    /// Create a new filesystem store rooted at the given directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn full_path(&self, source_ref: &str) -> Result<PathBuf> {
        // Locators are produced by this store; anything traversal-shaped is
        // not one of ours.
        if source_ref.split('/').any(|part| part == "..") || source_ref.starts_with('/') {
            return Err(Error::Storage(format!(
                "invalid source ref: {}",
                source_ref
            )));
        }
        Ok(self.base_path.join(source_ref))
    }

    /// Validate that the store can write, read, and delete files.
    ///
    /// Performs a full round-trip at startup to catch filesystem issues
    /// (permission errors, missing directories) early.
    pub async fn validate(&self) -> std::result::Result<(), String> {
        let test_dir = self.base_path.join("blobs/.health-check");
        let test_file = test_dir.join("test.bin");

        fs::create_dir_all(&test_dir)
            .await
            .map_err(|e| format!("create_dir_all({:?}): {}", test_dir, e))?;

        let data = b"storage-health-check";
        fs::write(&test_file, data)
            .await
            .map_err(|e| format!("write({:?}): {}", test_file, e))?;

        let read_data = fs::read(&test_file)
            .await
            .map_err(|e| format!("read({:?}): {}", test_file, e))?;
        if read_data != data {
            return Err("read-back mismatch".to_string());
        }

        fs::remove_file(&test_file)
            .await
            .map_err(|e| format!("remove_file({:?}): {}", test_file, e))?;
        let _ = fs::remove_dir(&test_dir).await; // Best-effort cleanup

        Ok(())
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn store(&self, data: &[u8], owner_id: Uuid, _suggested_name: &str) -> Result<String> {
        let source_ref = generate_storage_path(owner_id, new_v7());
        let full_path = self.full_path(&source_ref)?;
        debug!(
            subsystem = "storage",
            component = "filesystem",
            source_ref = %source_ref,
            size = data.len(),
            "Storing blob"
        );

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Storage(format!("failed to create {:?}: {}", parent, e)))?;
        }

        // Atomic write: temp file + rename
        let temp_path = full_path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Storage(format!("failed to create {:?}: {}", temp_path, e)))?;
        file.write_all(data)
            .await
            .map_err(|e| Error::Storage(format!("failed to write blob: {}", e)))?;
        file.sync_all()
            .await
            .map_err(|e| Error::Storage(format!("failed to sync blob: {}", e)))?;
        drop(file);

        fs::rename(&temp_path, &full_path)
            .await
            .map_err(|e| Error::Storage(format!("failed to finalize blob: {}", e)))?;

        // Blobs are plain data: rw-r--r--, no execute
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&full_path, std::fs::Permissions::from_mode(0o644))
                .await
                .map_err(|e| Error::Storage(format!("failed to set permissions: {}", e)))?;
        }

        Ok(source_ref)
    }

    async fn fetch(&self, source_ref: &str) -> Result<Vec<u8>> {
        let full_path = self.full_path(source_ref)?;
        fs::read(&full_path).await.map_err(|e| {
            Error::Storage(format!("failed to fetch source {}: {}", source_ref, e))
        })
    }

    async fn delete(&self, source_ref: &str) -> Result<bool> {
        let full_path = self.full_path(source_ref)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::Storage(format!(
                "failed to delete source {}: {}",
                source_ref, e
            ))),
        }
    }
}

/// Read-only blob fetcher for sources addressed by URL.
pub struct HttpBlobStore {
    client: reqwest::Client,
}

impl HttpBlobStore {
    /// Create a new HTTP fetcher with a default client.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create a fetcher reusing an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn store(&self, _data: &[u8], _owner_id: Uuid, _suggested_name: &str) -> Result<String> {
        Err(Error::Storage(
            "http blob store is read-only; uploads go through the provider".to_string(),
        ))
    }

    async fn fetch(&self, source_ref: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(source_ref)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                Error::Storage(format!("failed to fetch source {}: {}", source_ref, e))
            })?;

        let bytes = response.bytes().await.map_err(|e| {
            Error::Storage(format!("failed to read source {}: {}", source_ref, e))
        })?;
        Ok(bytes.to_vec())
    }

    async fn delete(&self, source_ref: &str) -> Result<bool> {
        warn!(
            subsystem = "storage",
            component = "http",
            source_ref = %source_ref,
            "HTTP blob store cannot delete; leaving blob to the provider"
        );
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_storage_path_shape() {
        let owner = new_v7();
        let blob = new_v7();
        let path = generate_storage_path(owner, blob);
        assert!(path.starts_with(&format!("blobs/{}/", owner.as_hyphenated())));
        assert!(path.ends_with(&format!("{}.bin", blob.as_hyphenated())));
        assert_eq!(path.matches('/').count(), 4);
    }

    #[tokio::test]
    async fn test_filesystem_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path());
        let owner = new_v7();

        let source_ref = store.store(b"blob bytes", owner, "scan.png").await.unwrap();
        assert_eq!(store.fetch(&source_ref).await.unwrap(), b"blob bytes");

        assert!(store.delete(&source_ref).await.unwrap());
        assert!(!store.delete(&source_ref).await.unwrap());
        assert!(store.fetch(&source_ref).await.is_err());
    }

    #[tokio::test]
    async fn test_filesystem_store_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path());

        assert!(store.fetch("../outside.bin").await.is_err());
        assert!(store.fetch("/etc/passwd").await.is_err());
        assert!(store.fetch("blobs/../../outside.bin").await.is_err());
    }

    #[tokio::test]
    async fn test_filesystem_validate() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path());
        assert!(store.validate().await.is_ok());
    }

    #[tokio::test]
    async fn test_http_store_is_read_only() {
        let store = HttpBlobStore::new();
        assert!(store.store(b"data", new_v7(), "a.bin").await.is_err());
        assert!(!store.delete("https://example.invalid/a.bin").await.unwrap());
    }
}
