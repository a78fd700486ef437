use std::collections::HashMap;

use serde::Serialize;

use super::Record;
use crate::errors::DomainError;

/// Record buckets addressed by canonical record key.
///
/// Buckets keep insertion order; multiple records per key (multi-A, multi-NS)
/// are expected. Serializes as the plain key → records map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RecordTable(HashMap<String, Vec<Record>>);

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserializes a YAML sequence of `{name, type, value}` maps, bucketed
    /// by record key in input order.
    pub fn from_yaml_slice(bytes: &[u8]) -> Result<Self, DomainError> {
        let records: Vec<Record> =
            serde_yaml::from_slice(bytes).map_err(|e| DomainError::Parse(e.to_string()))?;
        let mut table = Self::new();
        for record in records {
            table.insert(record);
        }
        Ok(table)
    }

    /// Appends the record to its key's bucket, creating the bucket if needed.
    pub fn insert(&mut self, record: Record) {
        let key = record.key();
        self.insert_under(key, record);
    }

    /// Appends under an explicit key. Lookups go by key alone; the record's
    /// own name may legitimately differ (wildcard rewrites).
    pub fn insert_under(&mut self, key: impl Into<String>, record: Record) {
        self.0.entry(key.into()).or_default().push(record);
    }

    /// Union merge: buckets from `other` are concatenated onto any existing
    /// bucket under the same key.
    pub fn append_merge(&mut self, other: RecordTable) {
        for (key, records) in other.0 {
            self.0.entry(key).or_default().extend(records);
        }
    }

    pub fn get(&self, key: &str) -> Option<&[Record]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn bucket_mut(&mut self, key: &str) -> Option<&mut Vec<Record>> {
        self.0.get_mut(key)
    }

    pub fn remove_bucket(&mut self, key: &str) -> Option<Vec<Record>> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Record>)> {
        self.0.iter()
    }

    /// Number of keys, not records.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total record count across all buckets.
    pub fn record_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

impl FromIterator<Record> for RecordTable {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut table = Self::new();
        for record in iter {
            table.insert(record);
        }
        table
    }
}
