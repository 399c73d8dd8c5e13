//! Typed access to the users, files, and sharing-relation collections

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sharebox_records::{Collection, Query, RecordStore, from_record, to_record};

use crate::error::AuthResult;
use crate::models::{FileRecord, NewFile, SharingRelation, User};

/// Partial update of a file record
///
/// Absent fields are skipped on serialization, so only the fields that are
/// set get merged into the stored record.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FileChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl FileChanges {
    /// Changes stamped with the current time
    pub fn touched() -> Self {
        Self {
            last_modified: Some(Utc::now()),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn owner(mut self, owner_key: impl Into<String>) -> Self {
        self.owner_key = Some(owner_key.into());
        self
    }

    pub fn deleted(mut self, deleted: bool) -> Self {
        self.deleted = Some(deleted);
        self
    }
}

/// Typed view over a shared [`RecordStore`]
#[derive(Clone)]
pub struct Catalog {
    records: Arc<dyn RecordStore>,
}

impl Catalog {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }

    // Users

    pub async fn insert_user(&self, username: &str, password_hash: &str) -> AuthResult<User> {
        let record = to_record(&serde_json::json!({
            "username": username,
            "password_hash": password_hash,
        }))?;
        let stored = self.records.insert(Collection::Users, record).await?;
        Ok(from_record(stored)?)
    }

    pub async fn get_user(&self, key: &str) -> AuthResult<Option<User>> {
        match self.records.get(Collection::Users, key).await? {
            Some(record) => Ok(Some(from_record(record)?)),
            None => Ok(None),
        }
    }

    pub async fn find_user_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let mut found = self
            .records
            .fetch(Collection::Users, &Query::new().eq("username", username))
            .await?;

        if found.is_empty() {
            return Ok(None);
        }
        Ok(Some(from_record(found.swap_remove(0))?))
    }

    pub async fn list_users(&self) -> AuthResult<Vec<User>> {
        let records = self.records.fetch(Collection::Users, &Query::new()).await?;
        records
            .into_iter()
            .map(|r| from_record::<User>(r).map_err(Into::into))
            .collect()
    }

    // Files

    pub async fn insert_file(&self, file: &NewFile) -> AuthResult<FileRecord> {
        let stored = self
            .records
            .insert(Collection::Files, to_record(file)?)
            .await?;
        Ok(from_record(stored)?)
    }

    pub async fn get_file(&self, key: &str) -> AuthResult<Option<FileRecord>> {
        match self.records.get(Collection::Files, key).await? {
            Some(record) => Ok(Some(from_record(record)?)),
            None => Ok(None),
        }
    }

    /// Files owned by a user, filtered by trash state
    pub async fn files_owned_by(&self, owner_key: &str, deleted: bool) -> AuthResult<Vec<FileRecord>> {
        let query = Query::new().eq("owner_key", owner_key).eq("deleted", deleted);
        let records = self.records.fetch(Collection::Files, &query).await?;
        records
            .into_iter()
            .map(|r| from_record::<FileRecord>(r).map_err(Into::into))
            .collect()
    }

    pub async fn update_file(&self, key: &str, changes: &FileChanges) -> AuthResult<()> {
        self.records
            .update(Collection::Files, key, to_record(changes)?)
            .await?;
        Ok(())
    }

    pub async fn delete_file(&self, key: &str) -> AuthResult<()> {
        self.records.delete(Collection::Files, key).await?;
        Ok(())
    }

    // Sharing relations

    /// The relation granting `user_key` access to `file_key`, if any
    pub async fn find_relation(
        &self,
        user_key: &str,
        file_key: &str,
    ) -> AuthResult<Option<SharingRelation>> {
        let query = Query::new().eq("user_key", user_key).eq("file_key", file_key);
        let mut found = self.records.fetch(Collection::UsersFiles, &query).await?;

        if found.is_empty() {
            return Ok(None);
        }
        Ok(Some(from_record(found.swap_remove(0))?))
    }

    /// All relations where the user is the grantee, in insertion order
    pub async fn relations_for_user(&self, user_key: &str) -> AuthResult<Vec<SharingRelation>> {
        let query = Query::new().eq("user_key", user_key);
        self.fetch_relations(&query).await
    }

    /// All relations attached to a file
    pub async fn relations_for_file(&self, file_key: &str) -> AuthResult<Vec<SharingRelation>> {
        let query = Query::new().eq("file_key", file_key);
        self.fetch_relations(&query).await
    }

    pub async fn insert_relation(
        &self,
        owner_key: &str,
        user_key: &str,
        file_key: &str,
    ) -> AuthResult<SharingRelation> {
        let record = to_record(&serde_json::json!({
            "owner_key": owner_key,
            "user_key": user_key,
            "file_key": file_key,
        }))?;
        let stored = self.records.insert(Collection::UsersFiles, record).await?;
        Ok(from_record(stored)?)
    }

    /// Rewrite both parties of an existing relation
    pub async fn update_relation(&self, key: &str, owner_key: &str, user_key: &str) -> AuthResult<()> {
        let fields = to_record(&serde_json::json!({
            "owner_key": owner_key,
            "user_key": user_key,
        }))?;
        self.records
            .update(Collection::UsersFiles, key, fields)
            .await?;
        Ok(())
    }

    pub async fn delete_relation(&self, key: &str) -> AuthResult<()> {
        self.records.delete(Collection::UsersFiles, key).await?;
        Ok(())
    }

    async fn fetch_relations(&self, query: &Query) -> AuthResult<Vec<SharingRelation>> {
        let records = self.records.fetch(Collection::UsersFiles, query).await?;
        records
            .into_iter()
            .map(|r| from_record::<SharingRelation>(r).map_err(Into::into))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharebox_records::InMemoryRecordStore;

    fn catalog() -> Catalog {
        Catalog::new(Arc::new(InMemoryRecordStore::new()))
    }

    #[tokio::test]
    async fn test_user_lookup() {
        let catalog = catalog();
        let alice = catalog.insert_user("alice", "$hash").await.unwrap();

        let found = catalog.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.key, alice.key);
        assert!(catalog.find_user_by_username("bob").await.unwrap().is_none());
        assert!(catalog.get_user(&alice.key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_file_changes_skip_absent_fields() {
        let catalog = catalog();
        let file = catalog
            .insert_file(&NewFile::new("a.txt", 3, "text/plain", "u1"))
            .await
            .unwrap();

        catalog
            .update_file(&file.key, &FileChanges::default().deleted(true))
            .await
            .unwrap();

        let updated = catalog.get_file(&file.key).await.unwrap().unwrap();
        assert!(updated.deleted);
        assert_eq!(updated.name, "a.txt");
        assert_eq!(updated.owner_key, "u1");
        assert_eq!(updated.last_modified, file.last_modified);
    }

    #[tokio::test]
    async fn test_files_owned_by_filters_trash() {
        let catalog = catalog();
        let a = catalog
            .insert_file(&NewFile::new("a", 1, "text/plain", "u1"))
            .await
            .unwrap();
        let b = catalog
            .insert_file(&NewFile::new("b", 1, "text/plain", "u1"))
            .await
            .unwrap();
        catalog
            .update_file(&b.key, &FileChanges::touched().deleted(true))
            .await
            .unwrap();

        let active = catalog.files_owned_by("u1", false).await.unwrap();
        let trash = catalog.files_owned_by("u1", true).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].key, a.key);
        assert_eq!(trash.len(), 1);
        assert_eq!(trash[0].key, b.key);
    }

    #[tokio::test]
    async fn test_relation_roundtrip() {
        let catalog = catalog();
        let rel = catalog.insert_relation("u1", "u2", "f1").await.unwrap();

        let found = catalog.find_relation("u2", "f1").await.unwrap().unwrap();
        assert_eq!(found, rel);
        assert!(catalog.find_relation("u1", "f1").await.unwrap().is_none());

        catalog.update_relation(&rel.key, "u2", "u1").await.unwrap();
        assert!(catalog.find_relation("u1", "f1").await.unwrap().is_some());

        catalog.delete_relation(&rel.key).await.unwrap();
        assert!(catalog.relations_for_file("f1").await.unwrap().is_empty());
    }
}
