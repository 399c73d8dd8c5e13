//! Stored entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub key: String,
    pub username: String,
    /// PHC-format password hash; never leaves the service
    pub password_hash: String,
}

/// File metadata; the bytes live in the blob store under the same key
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub key: String,
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub owner_key: String,
    pub last_modified: DateTime<Utc>,
    /// In the trash
    #[serde(default)]
    pub deleted: bool,
}

impl FileRecord {
    pub fn is_trashed(&self) -> bool {
        self.deleted
    }
}

/// Fields of a file record before the store assigns its key
#[derive(Clone, Debug, Serialize)]
pub struct NewFile {
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub owner_key: String,
    pub last_modified: DateTime<Utc>,
    pub deleted: bool,
}

impl NewFile {
    pub fn new(
        name: impl Into<String>,
        size: u64,
        content_type: impl Into<String>,
        owner_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            content_type: content_type.into(),
            owner_key: owner_key.into(),
            last_modified: Utc::now(),
            deleted: false,
        }
    }
}

/// `user_key` has been granted view access to `file_key` by `owner_key`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharingRelation {
    pub key: String,
    pub owner_key: String,
    pub user_key: String,
    pub file_key: String,
}
