//! In-memory storage backend

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};
use crate::traits::{Blob, BlobStore, validate_key};

/// In-memory storage for tests and ephemeral deployments
///
/// Thread-safe via `RwLock`. Not persistent; data is lost on drop.
#[derive(Default)]
pub struct InMemoryStorage {
    blobs: RwLock<HashMap<String, Blob>>,
}

fn poisoned<T>(_: PoisonError<T>) -> StorageError {
    StorageError::Backend("blob map lock poisoned".into())
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for InMemoryStorage {
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.blobs
            .write()
            .map_err(poisoned)?
            .insert(key.to_string(), Blob::new(data.to_vec(), content_type));
        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Blob> {
        self.blobs
            .read()
            .map_err(poisoned)?
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.blobs.write().map_err(poisoned)?.remove(key);
        Ok(())
    }
}
