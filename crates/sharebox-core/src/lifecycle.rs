//! File lifecycle manager

use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;
use sharebox_auth::{
    AccessControl, AuthError, Catalog, FileChanges, FileRecord, Identity, NewFile, Operation,
    SharingRelation, User,
};
use sharebox_records::RecordStore;
use sharebox_storage::BlobStore;

use crate::error::{LifecycleError, LifecycleResult};
use crate::upload::{
    DEFAULT_CONTENT_TYPE, DEFAULT_MAX_FILE_SIZE, UploadFailure, UploadItem, UploadOutcome,
};

/// Generic metadata patch
///
/// Only the display name is patchable. Ownership moves through
/// [`FileService::change_owner`], and the key never changes.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilePatch {
    #[serde(default)]
    pub name: Option<String>,
}

/// Content returned by a download
#[derive(Clone, Debug)]
pub struct Download {
    pub file: FileRecord,
    pub data: Vec<u8>,
}

/// Result of a share request; repeating a share is not an error
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShareOutcome {
    Created(SharingRelation),
    AlreadyShared(SharingRelation),
}

impl ShareOutcome {
    pub fn relation(&self) -> &SharingRelation {
        match self {
            ShareOutcome::Created(r) | ShareOutcome::AlreadyShared(r) => r,
        }
    }
}

/// Upload, organize, share, trash, and purge files
///
/// Holds injected store handles; cheap to clone into request handlers.
#[derive(Clone)]
pub struct FileService {
    access: AccessControl,
    blobs: Arc<dyn BlobStore>,
    max_file_size: u64,
}

impl FileService {
    pub fn new(records: Arc<dyn RecordStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            access: AccessControl::new(Catalog::new(records)),
            blobs,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    fn catalog(&self) -> &Catalog {
        self.access.catalog()
    }

    async fn user_by_name(&self, username: &str) -> LifecycleResult<User> {
        self.catalog()
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(username.to_string()).into())
    }

    /// Store a batch of files owned by the caller
    ///
    /// Items are independent: an oversized or failed item becomes a failure
    /// entry and processing continues with the next one.
    pub async fn upload(&self, user: &Identity, items: Vec<UploadItem>) -> Vec<UploadOutcome> {
        let mut outcomes = Vec::with_capacity(items.len());
        for item in items {
            let name = item.name.clone();
            let size = item.size();
            let outcome = match self.store_item(user, item).await {
                Ok(file) => UploadOutcome::Stored(file),
                Err(error) => {
                    tracing::warn!(user = %user, name = %name, size, "Upload item failed: {error}");
                    UploadOutcome::Failed(UploadFailure { name, size, error })
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn store_item(&self, user: &Identity, item: UploadItem) -> LifecycleResult<FileRecord> {
        let size = item.size();
        if size > self.max_file_size {
            return Err(LifecycleError::PayloadTooLarge {
                size,
                max: self.max_file_size,
            });
        }
        if item.name.trim().is_empty() {
            return Err(LifecycleError::BadRequest("Missing file name".into()));
        }

        let content_type = item
            .content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let new_file = NewFile::new(item.name, size, content_type.as_str(), &user.user_key);
        let file = self.catalog().insert_file(&new_file).await?;

        if let Err(e) = self.blobs.put(&file.key, &item.data, &content_type).await {
            return Err(inconsistent(
                "upload",
                &file.key,
                format!("file record {} was created", file.key),
                format!("the blob write failed: {e}"),
            ));
        }

        tracing::info!(user = %user, file = %file.key, size, "Uploaded file");
        Ok(file)
    }

    /// Metadata of a file the caller can view
    pub async fn get_file(&self, user: &Identity, key: &str) -> LifecycleResult<FileRecord> {
        Ok(self.access.authorize(user, key, Operation::View).await?)
    }

    /// Content of a file the caller can view
    pub async fn download(&self, user: &Identity, key: &str) -> LifecycleResult<Download> {
        let file = self.access.authorize(user, key, Operation::Download).await?;
        let blob = self.blobs.get(key).await?;
        Ok(Download {
            file,
            data: blob.data,
        })
    }

    pub async fn rename(&self, user: &Identity, key: &str, name: &str) -> LifecycleResult<FileRecord> {
        let mut file = self.access.authorize(user, key, Operation::Rename).await?;
        let name = validate_name(name)?;

        let changes = FileChanges::touched().name(name);
        self.catalog().update_file(key, &changes).await?;
        apply(&mut file, &changes);

        tracing::info!(user = %user, file = key, "Renamed file");
        Ok(file)
    }

    /// Apply a generic patch; null or absent fields are left alone
    pub async fn update(
        &self,
        user: &Identity,
        key: &str,
        patch: FilePatch,
    ) -> LifecycleResult<FileRecord> {
        let mut file = self.access.authorize(user, key, Operation::Update).await?;

        let mut changes = FileChanges::touched();
        if let Some(name) = patch.name {
            changes = changes.name(validate_name(&name)?);
        }

        self.catalog().update_file(key, &changes).await?;
        apply(&mut file, &changes);
        Ok(file)
    }

    /// Hand the file to another user
    ///
    /// Afterwards the previous owner holds exactly one grant on the file,
    /// issued by the new owner, and the new owner holds none. A grant either
    /// user already had is rewritten in place rather than duplicated. The
    /// relations are settled before the file's owner changes.
    pub async fn change_owner(
        &self,
        user: &Identity,
        key: &str,
        new_owner: &str,
    ) -> LifecycleResult<FileRecord> {
        let mut file = self.access.authorize(user, key, Operation::ChangeOwner).await?;
        let target = self.user_by_name(new_owner).await?;

        if target.key == file.owner_key {
            return Err(LifecycleError::BadRequest(
                "File is already owned by this user".into(),
            ));
        }
        if file.is_trashed() {
            return Err(LifecycleError::Forbidden("File is in trash".into()));
        }

        let old_owner = file.owner_key.clone();
        let (old_grants, target_grants): (Vec<_>, Vec<_>) = self
            .catalog()
            .relations_for_file(key)
            .await?
            .into_iter()
            .filter(|r| r.user_key == old_owner || r.user_key == target.key)
            .partition(|r| r.user_key == old_owner);

        let mut old_grants = old_grants.into_iter();
        let mut target_grants = target_grants.into_iter();
        let reused = old_grants.next().or_else(|| target_grants.next());
        let stale: Vec<SharingRelation> = old_grants.chain(target_grants).collect();

        match reused {
            Some(relation) => {
                self.catalog()
                    .update_relation(&relation.key, &target.key, &old_owner)
                    .await?
            }
            None => {
                self.catalog()
                    .insert_relation(&target.key, &old_owner, key)
                    .await?;
            }
        }
        let completed = format!("sharing relation {} -> {} was written", target.key, old_owner);

        for relation in &stale {
            if let Err(e) = self.catalog().delete_relation(&relation.key).await {
                return Err(inconsistent(
                    "change_owner",
                    key,
                    completed,
                    format!("removing stale relation {} failed: {e}", relation.key),
                ));
            }
        }

        let changes = FileChanges::touched().owner(target.key.clone());
        if let Err(e) = self.catalog().update_file(key, &changes).await {
            return Err(inconsistent(
                "change_owner",
                key,
                completed,
                format!("the file owner update failed: {e}"),
            ));
        }
        apply(&mut file, &changes);

        tracing::info!(file = key, from = %old_owner, to = %target.key, "Changed file owner");
        Ok(file)
    }

    /// Grant another user view access
    ///
    /// Idempotent: sharing again with the same user returns the existing
    /// relation.
    pub async fn share(
        &self,
        user: &Identity,
        key: &str,
        share_with: &str,
    ) -> LifecycleResult<ShareOutcome> {
        let file = self.access.authorize(user, key, Operation::Share).await?;
        let target = self.user_by_name(share_with).await?;

        if target.key == file.owner_key {
            return Err(LifecycleError::BadRequest(
                "Cannot share a file with its owner".into(),
            ));
        }
        if file.is_trashed() {
            return Err(LifecycleError::Forbidden("File is in trash".into()));
        }

        if let Some(existing) = self.catalog().find_relation(&target.key, key).await? {
            return Ok(ShareOutcome::AlreadyShared(existing));
        }

        let relation = self
            .catalog()
            .insert_relation(&file.owner_key, &target.key, key)
            .await?;

        tracing::info!(file = key, with = %target.key, "Shared file");
        Ok(ShareOutcome::Created(relation))
    }

    /// Drop the caller's own shared access to a file
    pub async fn stop_seeing(&self, user: &Identity, key: &str) -> LifecycleResult<()> {
        let (_, relation) = self.access.require_grant(user, key).await?;
        self.catalog().delete_relation(&relation.key).await?;

        tracing::info!(user = %user, file = key, "Stopped seeing file");
        Ok(())
    }

    pub async fn send_to_trash(&self, user: &Identity, key: &str) -> LifecycleResult<FileRecord> {
        let mut file = self.access.authorize(user, key, Operation::SendToTrash).await?;
        if file.is_trashed() {
            return Err(LifecycleError::Forbidden("File is already in trash".into()));
        }

        let changes = FileChanges::touched().deleted(true);
        self.catalog().update_file(key, &changes).await?;
        apply(&mut file, &changes);

        tracing::info!(user = %user, file = key, "Sent file to trash");
        Ok(file)
    }

    pub async fn restore(&self, user: &Identity, key: &str) -> LifecycleResult<FileRecord> {
        let mut file = self.access.authorize(user, key, Operation::Restore).await?;
        if !file.is_trashed() {
            return Err(LifecycleError::Forbidden("File is not in trash".into()));
        }

        let changes = FileChanges::touched().deleted(false);
        self.catalog().update_file(key, &changes).await?;
        apply(&mut file, &changes);

        tracing::info!(user = %user, file = key, "Restored file");
        Ok(file)
    }

    /// Remove a trashed file's record, content, and sharing relations
    pub async fn permanent_delete(&self, user: &Identity, key: &str) -> LifecycleResult<()> {
        let file = self
            .access
            .authorize(user, key, Operation::PermanentDelete)
            .await?;
        if !file.is_trashed() {
            return Err(LifecycleError::Forbidden("File is not in trash".into()));
        }

        self.catalog().delete_file(key).await?;

        if let Err(e) = self.blobs.delete(key).await {
            return Err(inconsistent(
                "permanent_delete",
                key,
                format!("file record {key} was deleted"),
                format!("the blob delete failed: {e}"),
            ));
        }

        let dangling = |e: AuthError| {
            inconsistent(
                "permanent_delete",
                key,
                format!("file record and blob {key} were deleted"),
                format!("removing its sharing relations failed: {e}"),
            )
        };
        let relations = self.catalog().relations_for_file(key).await.map_err(dangling)?;
        for relation in relations {
            self.catalog()
                .delete_relation(&relation.key)
                .await
                .map_err(dangling)?;
        }

        tracing::info!(user = %user, file = key, "Permanently deleted file");
        Ok(())
    }

    /// Active files the caller owns
    pub async fn list_owned(&self, user: &Identity) -> LifecycleResult<Vec<FileRecord>> {
        Ok(self.catalog().files_owned_by(&user.user_key, false).await?)
    }

    /// Active files shared with the caller, in the order they were shared
    pub async fn list_shared(&self, user: &Identity) -> LifecycleResult<Vec<FileRecord>> {
        let relations = self.catalog().relations_for_user(&user.user_key).await?;

        let mut seen = HashSet::new();
        let mut files = Vec::new();
        for relation in relations {
            if !seen.insert(relation.file_key.clone()) {
                continue;
            }
            // Relations can outlive their file
            let Some(file) = self.catalog().get_file(&relation.file_key).await? else {
                continue;
            };
            if file.is_trashed() || file.owner_key == user.user_key {
                continue;
            }
            files.push(file);
        }
        Ok(files)
    }

    /// Owned files followed by shared files
    pub async fn list_files(&self, user: &Identity) -> LifecycleResult<Vec<FileRecord>> {
        let mut files = self.list_owned(user).await?;
        files.extend(self.list_shared(user).await?);
        Ok(files)
    }

    /// Trashed files the caller owns
    pub async fn list_trash(&self, user: &Identity) -> LifecycleResult<Vec<FileRecord>> {
        Ok(self.catalog().files_owned_by(&user.user_key, true).await?)
    }
}

fn validate_name(name: &str) -> LifecycleResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LifecycleError::BadRequest("File name cannot be empty".into()));
    }
    Ok(name)
}

/// Mirror a successful write onto the record already in hand
fn apply(file: &mut FileRecord, changes: &FileChanges) {
    if let Some(name) = &changes.name {
        file.name = name.clone();
    }
    if let Some(owner_key) = &changes.owner_key {
        file.owner_key = owner_key.clone();
    }
    if let Some(deleted) = changes.deleted {
        file.deleted = deleted;
    }
    if let Some(last_modified) = changes.last_modified {
        file.last_modified = last_modified;
    }
}

fn inconsistent(
    operation: &'static str,
    file: &str,
    completed: String,
    failed: String,
) -> LifecycleError {
    let err = LifecycleError::Inconsistent {
        operation,
        completed,
        failed,
    };
    tracing::error!(file, "{err}");
    err
}
