//! sharebox-storage: Key-addressed blob storage
//!
//! Holds raw file contents keyed by the file record's key. No authorization
//! logic lives here; callers decide who may read or delete a blob.
//!
//! ## Backends
//!
//! | Backend            | Use Case                 |
//! |--------------------|--------------------------|
//! | `InMemoryStorage`  | Unit tests, ephemeral    |
//! | `LocalFileStorage` | Single-node deployments  |
//!
//! ## Example
//!
//! ```rust,ignore
//! use sharebox_storage::{BlobStore, InMemoryStorage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage = InMemoryStorage::new();
//!
//!     storage.put("f1", b"Hello, blobs!", "text/plain").await?;
//!     let blob = storage.get("f1").await?;
//!     assert_eq!(blob.data, b"Hello, blobs!");
//!
//!     Ok(())
//! }
//! ```

mod error;
mod traits;

mod local;
mod memory;

// Re-exports
pub use error::{StorageError, StorageResult};
pub use traits::{Blob, BlobStore, validate_key};

pub use local::LocalFileStorage;
pub use memory::InMemoryStorage;
