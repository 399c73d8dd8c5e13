//! Local filesystem storage backend

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{StorageError, StorageResult};
use crate::traits::{Blob, BlobStore, validate_key};

const BLOBS_DIR: &str = "blobs";
const META_DIR: &str = "meta";

/// Sidecar written next to every blob
#[derive(Debug, Serialize, Deserialize)]
struct BlobMeta {
    content_type: String,
    size: u64,
    /// Blake3 of the blob bytes, hex encoded
    checksum: String,
}

/// Local filesystem storage
///
/// Structure:
/// ```text
/// {root}/
///   blobs/{key}
///   meta/{key}.json
/// ```
/// The metadata sidecar carries the content type and a Blake3 checksum that
/// is verified on every read.
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    /// Create storage at the given root directory
    ///
    /// Creates the directory structure if it doesn't exist.
    pub async fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join(BLOBS_DIR)).await?;
        fs::create_dir_all(root.join(META_DIR)).await?;
        Ok(Self { root })
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.root.join(BLOBS_DIR).join(key)
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.root.join(META_DIR).join(format!("{key}.json"))
    }
}

#[async_trait]
impl BlobStore for LocalFileStorage {
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> StorageResult<()> {
        validate_key(key)?;

        let meta = BlobMeta {
            content_type: content_type.to_string(),
            size: data.len() as u64,
            checksum: blake3::hash(data).to_hex().to_string(),
        };

        fs::write(self.blob_path(key), data).await?;
        fs::write(self.meta_path(key), serde_json::to_vec(&meta)?).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Blob> {
        validate_key(key)?;

        let meta_bytes = match fs::read(self.meta_path(key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let meta: BlobMeta = serde_json::from_slice(&meta_bytes)?;

        let data = match fs::read(self.blob_path(key)).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        // Verify on read
        let actual = blake3::hash(&data).to_hex().to_string();
        if actual != meta.checksum {
            return Err(StorageError::ChecksumMismatch {
                key: key.to_string(),
                expected: meta.checksum,
                actual,
            });
        }

        Ok(Blob::new(data, meta.content_type))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;

        for path in [self.blob_path(key), self.meta_path(key)] {
            match fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
