//! In-memory record store

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::collection::Collection;
use crate::error::{RecordError, RecordResult};
use crate::query::Query;
use crate::store::{Record, RecordStore, assign_key, check_update_fields, record_key};

/// In-memory record store for tests and ephemeral deployments
///
/// Records are kept per collection in insertion order.
#[derive(Default)]
pub struct InMemoryRecordStore {
    collections: RwLock<HashMap<Collection, Vec<Record>>>,
}

fn poisoned<T>(_: PoisonError<T>) -> RecordError {
    RecordError::Storage("record map lock poisoned".into())
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn position(records: &[Record], key: &str) -> Option<usize> {
    records
        .iter()
        .position(|r| record_key(r).is_ok_and(|k| k == key))
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, collection: Collection, record: Record) -> RecordResult<Record> {
        let (key, record) = assign_key(record)?;
        let mut collections = self.collections.write().map_err(poisoned)?;
        let records = collections.entry(collection).or_default();

        if position(records, &key).is_some() {
            return Err(RecordError::AlreadyExists { collection, key });
        }

        records.push(record.clone());
        Ok(record)
    }

    async fn get(&self, collection: Collection, key: &str) -> RecordResult<Option<Record>> {
        let collections = self.collections.read().map_err(poisoned)?;
        Ok(collections
            .get(&collection)
            .and_then(|records| position(records, key).map(|i| records[i].clone())))
    }

    async fn fetch(&self, collection: Collection, query: &Query) -> RecordResult<Vec<Record>> {
        let collections = self.collections.read().map_err(poisoned)?;
        Ok(collections
            .get(&collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| query.matches(r))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update(&self, collection: Collection, key: &str, fields: Record) -> RecordResult<()> {
        check_update_fields(key, &fields)?;

        let not_found = || RecordError::NotFound {
            collection,
            key: key.to_string(),
        };

        let mut collections = self.collections.write().map_err(poisoned)?;
        let records = collections.get_mut(&collection).ok_or_else(not_found)?;
        let index = position(records, key).ok_or_else(not_found)?;

        records[index].extend(fields);
        Ok(())
    }

    async fn delete(&self, collection: Collection, key: &str) -> RecordResult<()> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        if let Some(records) = collections.get_mut(&collection) {
            records.retain(|r| !record_key(r).is_ok_and(|k| k == key));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::to_record;
    use serde_json::json;

    fn rec(value: serde_json::Value) -> Record {
        to_record(&value).unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_key() {
        let store = InMemoryRecordStore::new();

        let stored = store
            .insert(Collection::Users, rec(json!({"username": "alice"})))
            .await
            .unwrap();
        let key = record_key(&stored).unwrap().to_string();

        let fetched = store.get(Collection::Users, &key).await.unwrap().unwrap();
        assert_eq!(fetched["username"], "alice");

        let files = store.fetch(Collection::Files, &Query::new()).await.unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_insert_duplicate_key() {
        let store = InMemoryRecordStore::new();

        store
            .insert(Collection::Files, rec(json!({"key": "f1"})))
            .await
            .unwrap();
        let result = store
            .insert(Collection::Files, rec(json!({"key": "f1"})))
            .await;
        assert!(matches!(result, Err(RecordError::AlreadyExists { .. })));

        // Same key in another collection is fine
        store
            .insert(Collection::Users, rec(json!({"key": "f1"})))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_fetch_in_insertion_order() {
        let store = InMemoryRecordStore::new();

        for (name, owner) in [("a", "u1"), ("b", "u2"), ("c", "u1")] {
            store
                .insert(
                    Collection::Files,
                    rec(json!({"name": name, "owner_key": owner, "deleted": false})),
                )
                .await
                .unwrap();
        }

        let owned = store
            .fetch(Collection::Files, &Query::new().eq("owner_key", "u1"))
            .await
            .unwrap();
        let names: Vec<_> = owned.iter().map(|r| r["name"].clone()).collect();
        assert_eq!(names, vec![json!("a"), json!("c")]);

        let all = store.fetch(Collection::Files, &Query::new()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_update_merges() {
        let store = InMemoryRecordStore::new();
        store
            .insert(
                Collection::Files,
                rec(json!({"key": "f1", "name": "old", "deleted": false})),
            )
            .await
            .unwrap();

        store
            .update(Collection::Files, "f1", rec(json!({"name": "new"})))
            .await
            .unwrap();

        let record = store.get(Collection::Files, "f1").await.unwrap().unwrap();
        assert_eq!(record["name"], "new");
        assert_eq!(record["deleted"], false);
    }

    #[tokio::test]
    async fn test_update_missing() {
        let store = InMemoryRecordStore::new();
        let result = store
            .update(Collection::Files, "nope", rec(json!({"name": "x"})))
            .await;
        assert!(matches!(result, Err(RecordError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_cannot_change_key() {
        let store = InMemoryRecordStore::new();
        store
            .insert(Collection::Files, rec(json!({"key": "f1"})))
            .await
            .unwrap();

        let result = store
            .update(Collection::Files, "f1", rec(json!({"key": "f2"})))
            .await;
        assert!(matches!(result, Err(RecordError::InvalidRecord(_))));
    }

    #[tokio::test]
    async fn test_delete_idempotent() {
        let store = InMemoryRecordStore::new();
        store
            .insert(Collection::Files, rec(json!({"key": "f1"})))
            .await
            .unwrap();

        store.delete(Collection::Files, "f1").await.unwrap();
        assert!(store.get(Collection::Files, "f1").await.unwrap().is_none());
        store.delete(Collection::Files, "f1").await.unwrap();
    }
}
