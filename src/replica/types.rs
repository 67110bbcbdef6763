use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Logical field name (`RA`, `nomeAluno`, ...) to the A1 cell holding it.
///
/// The same cell is read on the active sheet and written on the replica.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, String>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn insert(&mut self, field: impl Into<String>, cell: impl Into<String>) {
        self.0.insert(field.into(), cell.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FieldMap(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A field that could not be copied into the replica
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldWarning {
    pub field: String,
    pub cell: String,
    pub message: String,
}

/// The spreadsheet produced by one replication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicaOutcome {
    pub spreadsheet_id: String,
    pub title: String,
    pub url: String,
    /// Best-effort field copies that failed
    pub warnings: Vec<FieldWarning>,
}
