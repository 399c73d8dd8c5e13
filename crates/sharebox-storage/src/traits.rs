//! Storage trait definitions

use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};

/// A stored blob together with the content type it was uploaded with
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
    pub content_type: String,
}

impl Blob {
    pub fn new(data: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            data,
            content_type: content_type.into(),
        }
    }
}

/// Reject keys that could escape a backend's namespace
///
/// Keys are opaque record identifiers; anything containing path separators,
/// dot segments, or control characters is refused.
pub fn validate_key(key: &str) -> StorageResult<()> {
    let bad = key.is_empty()
        || key == "."
        || key == ".."
        || key.len() > 128
        || key
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_control());

    if bad {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Key-addressed blob storage
///
/// Keys are the owning file record's key, so a blob lives exactly as long as
/// its record. Implementations must be safe to share across request tasks.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under a key, replacing any previous blob
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> StorageResult<()>;

    /// Retrieve a blob by key
    ///
    /// Returns `StorageError::NotFound` if nothing is stored under the key.
    async fn get(&self, key: &str) -> StorageResult<Blob>;

    /// Delete a blob
    ///
    /// Returns `Ok(())` even if the blob didn't exist (idempotent).
    async fn delete(&self, key: &str) -> StorageResult<()>;
}
