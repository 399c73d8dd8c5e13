//! Access engine: who may perform which operation on which file

use crate::catalog::Catalog;
use crate::error::{AuthError, AuthResult};
use crate::identity::Identity;
use crate::models::{FileRecord, SharingRelation};

/// Operations a caller can attempt on a file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Read metadata
    View,
    /// Read content
    Download,
    Rename,
    /// Generic field patch
    Update,
    ChangeOwner,
    Share,
    /// Drop one's own shared access
    StopSeeing,
    SendToTrash,
    Restore,
    PermanentDelete,
}

/// Relationship to the file an operation demands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    /// Owner or shared user
    Viewer,
    Owner,
    /// Shared user holding a relation; ownership does not count
    Grantee,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::View => "view",
            Operation::Download => "download",
            Operation::Rename => "rename",
            Operation::Update => "update",
            Operation::ChangeOwner => "change_owner",
            Operation::Share => "share",
            Operation::StopSeeing => "stop_seeing",
            Operation::SendToTrash => "send_to_trash",
            Operation::Restore => "restore",
            Operation::PermanentDelete => "permanent_delete",
        }
    }

    pub fn requirement(&self) -> Requirement {
        match self {
            Operation::View | Operation::Download => Requirement::Viewer,
            Operation::StopSeeing => Requirement::Grantee,
            Operation::Rename
            | Operation::Update
            | Operation::ChangeOwner
            | Operation::Share
            | Operation::SendToTrash
            | Operation::Restore
            | Operation::PermanentDelete => Requirement::Owner,
        }
    }
}

/// Decides allow/deny from file ownership and the sharing relations
///
/// Every check loads the file first: a missing file is `FileNotFound`,
/// an existing file the caller may not touch is `Forbidden`.
#[derive(Clone)]
pub struct AccessControl {
    catalog: Catalog,
}

impl AccessControl {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    async fn load(&self, file_key: &str) -> AuthResult<FileRecord> {
        self.catalog
            .get_file(file_key)
            .await?
            .ok_or_else(|| AuthError::FileNotFound(file_key.to_string()))
    }

    /// True iff the caller owns the file
    pub async fn is_owner(&self, user: &Identity, file_key: &str) -> AuthResult<bool> {
        let file = self.load(file_key).await?;
        Ok(file.owner_key == user.user_key)
    }

    /// True iff a sharing relation grants the caller access to the file
    pub async fn has_shared_access(&self, user: &Identity, file_key: &str) -> AuthResult<bool> {
        Ok(self
            .catalog
            .find_relation(&user.user_key, file_key)
            .await?
            .is_some())
    }

    /// Owner or shared user
    pub async fn can_view(&self, user: &Identity, file_key: &str) -> AuthResult<bool> {
        if self.is_owner(user, file_key).await? {
            return Ok(true);
        }
        self.has_shared_access(user, file_key).await
    }

    /// Only the owner mutates
    pub async fn can_mutate(&self, user: &Identity, file_key: &str) -> AuthResult<bool> {
        self.is_owner(user, file_key).await
    }

    /// Load the file and check the caller may perform `operation` on it
    ///
    /// Returns the file record so callers don't fetch it twice.
    pub async fn authorize(
        &self,
        user: &Identity,
        file_key: &str,
        operation: Operation,
    ) -> AuthResult<FileRecord> {
        let file = self.load(file_key).await?;
        let owner = file.owner_key == user.user_key;

        let allowed = match operation.requirement() {
            Requirement::Owner => owner,
            Requirement::Viewer => {
                // A trashed file is visible to its owner only
                if file.is_trashed() {
                    owner
                } else {
                    owner || self.has_shared_access(user, file_key).await?
                }
            }
            Requirement::Grantee => {
                !owner && self.has_shared_access(user, file_key).await?
            }
        };

        if !allowed {
            tracing::warn!(
                user = %user,
                file = file_key,
                operation = operation.as_str(),
                "Access denied"
            );
            return Err(AuthError::Forbidden(denial_message(operation)));
        }

        Ok(file)
    }

    /// The caller's relation to a file they do not own
    pub async fn require_grant(
        &self,
        user: &Identity,
        file_key: &str,
    ) -> AuthResult<(FileRecord, SharingRelation)> {
        let file = self.load(file_key).await?;

        let relation = if file.owner_key == user.user_key {
            None
        } else {
            self.catalog.find_relation(&user.user_key, file_key).await?
        };

        match relation {
            Some(relation) => Ok((file, relation)),
            None => Err(AuthError::Forbidden(denial_message(Operation::StopSeeing))),
        }
    }
}

fn denial_message(operation: Operation) -> String {
    match operation.requirement() {
        Requirement::Owner => "Only the file owner can do this".into(),
        Requirement::Viewer => "You do not have access to this file".into(),
        Requirement::Grantee => "File is not shared with you".into(),
    }
}
