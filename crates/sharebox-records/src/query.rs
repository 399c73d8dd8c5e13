//! Exact-match record queries

use serde_json::Value;

use crate::store::Record;

/// Exact-match filter over one or more record fields
///
/// An empty query matches every record in the collection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    conditions: Vec<(String, Value)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    /// Check a record against every condition
    pub fn matches(&self, record: &Record) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| record.get(field) == Some(expected))
    }
}
