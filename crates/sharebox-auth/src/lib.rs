//! sharebox-auth: Identity and authorization for shared file storage
//!
//! Provides the typed view over the record store (users, files, sharing
//! relations), the credential service (password hashing and bearer tokens),
//! and the access engine that decides who may do what to which file.
//!
//! ## Access model
//!
//! | Operation                                        | Who                  |
//! |--------------------------------------------------|----------------------|
//! | view, download                                   | owner or shared user |
//! | rename, patch, change owner, share, trash, purge | owner                |
//! | stop seeing                                      | shared user          |
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sharebox_auth::{AccessControl, Catalog, Operation};
//! use sharebox_records::InMemoryRecordStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = Catalog::new(Arc::new(InMemoryRecordStore::new()));
//!     let access = AccessControl::new(catalog.clone());
//!
//!     // Existence first (NotFound), then permission (Forbidden)
//!     let file = access.authorize(&identity, &file_key, Operation::Rename).await?;
//!     Ok(())
//! }
//! ```

mod access;
mod catalog;
mod credentials;
mod error;
mod identity;
mod models;

// Re-exports
pub use access::{AccessControl, Operation, Requirement};
pub use catalog::{Catalog, FileChanges};
pub use credentials::{Claims, CredentialService, DEFAULT_TOKEN_TTL_HOURS, JwtCredentials};
pub use error::{AuthError, AuthResult};
pub use identity::Identity;
pub use models::{FileRecord, NewFile, SharingRelation, User};
