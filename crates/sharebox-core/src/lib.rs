//! sharebox-core: File lifecycle and accounts
//!
//! Every operation takes the caller's resolved [`Identity`] explicitly,
//! checks it through the access engine before any write, and then applies
//! one transition of the per-file state machine:
//!
//! ```text
//! ACTIVE ──send_to_trash──▶ TRASHED ──permanent_delete──▶ PURGED
//!    ▲                         │
//!    └────────restore──────────┘
//! ```
//!
//! Multi-write operations (upload, change owner, permanent delete) are
//! ordered sequences over stores with no shared transaction. When a later
//! write fails after an earlier one succeeded the operation reports
//! [`LifecycleError::Inconsistent`] naming the half that completed.
//!
//! Concurrent writers to the same file are not isolated from each other;
//! the last write wins.

mod accounts;
mod error;
mod lifecycle;
mod upload;

pub use accounts::{AccountService, LoginToken};
pub use error::{LifecycleError, LifecycleResult};
pub use lifecycle::{Download, FilePatch, FileService, ShareOutcome};
pub use upload::{DEFAULT_MAX_FILE_SIZE, UploadFailure, UploadItem, UploadOutcome};

pub use sharebox_auth::{FileRecord, Identity, SharingRelation, User};
