//! Integration tests for LocalFileStorage

use sharebox_storage::{BlobStore, LocalFileStorage, StorageError};
use tempfile::TempDir;

#[tokio::test]
async fn test_local_put_get() {
    let temp = TempDir::new().unwrap();
    let storage = LocalFileStorage::new(temp.path()).await.unwrap();

    storage
        .put("k1", b"Local file storage test", "text/plain")
        .await
        .unwrap();
    let blob = storage.get("k1").await.unwrap();
    assert_eq!(blob.data, b"Local file storage test");
    assert_eq!(blob.content_type, "text/plain");
}

#[tokio::test]
async fn test_local_persistence() {
    let temp = TempDir::new().unwrap();

    // Write with one instance
    {
        let storage = LocalFileStorage::new(temp.path()).await.unwrap();
        storage.put("k1", b"Persistent data", "image/png").await.unwrap();
    }

    // Read with new instance
    {
        let storage = LocalFileStorage::new(temp.path()).await.unwrap();
        let blob = storage.get("k1").await.unwrap();
        assert_eq!(blob.data, b"Persistent data");
        assert_eq!(blob.content_type, "image/png");
    }
}

#[tokio::test]
async fn test_local_not_found() {
    let temp = TempDir::new().unwrap();
    let storage = LocalFileStorage::new(temp.path()).await.unwrap();

    let result = storage.get("missing").await;
    assert!(matches!(result, Err(StorageError::NotFound(_))));
}

#[tokio::test]
async fn test_local_delete() {
    let temp = TempDir::new().unwrap();
    let storage = LocalFileStorage::new(temp.path()).await.unwrap();

    storage.put("k1", b"bytes", "text/plain").await.unwrap();
    storage.delete("k1").await.unwrap();

    assert!(matches!(storage.get("k1").await, Err(StorageError::NotFound(_))));
    assert!(!temp.path().join("blobs").join("k1").exists());
    assert!(!temp.path().join("meta").join("k1.json").exists());

    // Idempotent
    storage.delete("k1").await.unwrap();
}

#[tokio::test]
async fn test_local_detects_tampering() {
    let temp = TempDir::new().unwrap();
    let storage = LocalFileStorage::new(temp.path()).await.unwrap();

    storage.put("k1", b"original", "text/plain").await.unwrap();
    std::fs::write(temp.path().join("blobs").join("k1"), b"tampered").unwrap();

    let result = storage.get("k1").await;
    assert!(matches!(result, Err(StorageError::ChecksumMismatch { .. })));
}

#[tokio::test]
async fn test_local_rejects_traversal() {
    let temp = TempDir::new().unwrap();
    let storage = LocalFileStorage::new(temp.path()).await.unwrap();

    let result = storage.put("../outside", b"x", "text/plain").await;
    assert!(matches!(result, Err(StorageError::InvalidKey(_))));
}
