//! sharebox-records: Generic record store
//!
//! CRUD over three keyed collections (`users`, `files`, `users_files`).
//! Records are JSON objects; each carries its opaque identifier under the
//! `key` field. Queries are exact-match filters over one or more fields.
//! There is no business logic here and no cross-record transaction.
//!
//! ## Features
//!
//! | Feature  | Description                    |
//! |----------|--------------------------------|
//! | (none)   | In-memory backend only         |
//! | `sqlite` | SQLite persistence             |
//!
//! ## Example
//!
//! ```rust,ignore
//! use sharebox_records::{Collection, InMemoryRecordStore, Query, RecordStore};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = InMemoryRecordStore::new();
//!
//!     let record = sharebox_records::to_record(&json!({"username": "alice"}))?;
//!     let stored = store.insert(Collection::Users, record).await?;
//!
//!     let found = store
//!         .fetch(Collection::Users, &Query::new().eq("username", "alice"))
//!         .await?;
//!     assert_eq!(found[0]["key"], stored["key"]);
//!     Ok(())
//! }
//! ```

mod collection;
mod error;
mod query;
mod store;

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-exports
pub use collection::Collection;
pub use error::{RecordError, RecordResult};
pub use query::Query;
pub use store::{KEY_FIELD, Record, RecordStore, from_record, new_key, record_key, to_record};

pub use memory::InMemoryRecordStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRecordStore;
