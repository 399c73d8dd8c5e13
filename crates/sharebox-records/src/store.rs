//! Record store trait and record helpers

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::collection::Collection;
use crate::error::{RecordError, RecordResult};
use crate::query::Query;

/// A stored record: a JSON object carrying its identifier under `key`
pub type Record = serde_json::Map<String, Value>;

/// Name of the identifier field present on every stored record
pub const KEY_FIELD: &str = "key";

/// Generate a fresh opaque record key
pub fn new_key() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Read the key of a stored record
pub fn record_key(record: &Record) -> RecordResult<&str> {
    record
        .get(KEY_FIELD)
        .and_then(Value::as_str)
        .ok_or_else(|| RecordError::InvalidRecord("record has no string key".into()))
}

/// Serialize a value into a record (must serialize to a JSON object)
pub fn to_record<T: Serialize + ?Sized>(value: &T) -> RecordResult<Record> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(RecordError::InvalidRecord(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Deserialize a record into a typed value
pub fn from_record<T: DeserializeOwned>(record: Record) -> RecordResult<T> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

/// Generic CRUD over keyed collections
///
/// Each call is atomic for the single record it touches; nothing spans
/// records. Callers sequencing several writes must handle partial failure
/// themselves.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a record, assigning a fresh key if it has none
    ///
    /// Returns the record as stored (with its key). Fails with
    /// `AlreadyExists` if the supplied key is taken.
    async fn insert(&self, collection: Collection, record: Record) -> RecordResult<Record>;

    /// Look up a single record by key
    async fn get(&self, collection: Collection, key: &str) -> RecordResult<Option<Record>>;

    /// All records matching the query, in insertion order
    async fn fetch(&self, collection: Collection, query: &Query) -> RecordResult<Vec<Record>>;

    /// Merge `fields` into an existing record
    ///
    /// The `key` field cannot be changed. Fails with `NotFound` if the record
    /// does not exist.
    async fn update(&self, collection: Collection, key: &str, fields: Record) -> RecordResult<()>;

    /// Remove a record
    ///
    /// Returns `Ok(())` even if the record didn't exist (idempotent).
    async fn delete(&self, collection: Collection, key: &str) -> RecordResult<()>;
}

/// Reject updates that try to rewrite the identifier
pub(crate) fn check_update_fields(key: &str, fields: &Record) -> RecordResult<()> {
    match fields.get(KEY_FIELD) {
        None => Ok(()),
        Some(Value::String(k)) if k == key => Ok(()),
        Some(_) => Err(RecordError::InvalidRecord("record key cannot be changed".into())),
    }
}

/// Ensure an inserted record has a key, generating one if absent
pub(crate) fn assign_key(mut record: Record) -> RecordResult<(String, Record)> {
    let key = match record.get(KEY_FIELD) {
        None | Some(Value::Null) => new_key(),
        Some(Value::String(k)) if !k.is_empty() => k.clone(),
        Some(_) => {
            return Err(RecordError::InvalidRecord(
                "record key must be a non-empty string".into(),
            ));
        }
    };
    record.insert(KEY_FIELD.to_string(), Value::String(key.clone()));
    Ok((key, record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_record_requires_object() {
        assert!(to_record(&json!({"a": 1})).is_ok());
        assert!(matches!(
            to_record(&json!([1, 2])),
            Err(RecordError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_assign_key() {
        let (key, record) = assign_key(to_record(&json!({"a": 1})).unwrap()).unwrap();
        assert_eq!(key.len(), 32);
        assert_eq!(record_key(&record).unwrap(), key);

        let (key, _) = assign_key(to_record(&json!({"key": "fixed"})).unwrap()).unwrap();
        assert_eq!(key, "fixed");

        assert!(assign_key(to_record(&json!({"key": 7})).unwrap()).is_err());
    }

    #[test]
    fn test_check_update_fields() {
        let same = to_record(&json!({"key": "k", "name": "x"})).unwrap();
        let other = to_record(&json!({"key": "j"})).unwrap();
        assert!(check_update_fields("k", &same).is_ok());
        assert!(check_update_fields("k", &other).is_err());
    }
}
