//! Customer record types, pre-normalization.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unique customer identifier: the dataset's SK_ID_CURR column, a
/// positive integer unique per row.
pub type CustomerId = u64;

/// A single field value exactly as stored in the dataset.
///
/// Untagged so JSON records round-trip naturally: numbers, strings,
/// booleans, and `null` for missing cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Missing,
}

impl RawValue {
    /// True for cells with no stored value.
    pub fn is_missing(&self) -> bool {
        matches!(self, RawValue::Missing)
    }
}

/// One customer's row as loaded from the dataset, keyed by column name.
///
/// Read-only once built; the ordered map keeps iteration deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(BTreeMap<String, RawValue>);

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: RawValue) -> Option<RawValue> {
        self.0.insert(column.into(), value)
    }

    pub fn get(&self, column: &str) -> Option<&RawValue> {
        self.0.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RawValue)> {
        self.0.iter()
    }
}

impl FromIterator<(String, RawValue)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (String, RawValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_value_json_round_trip() {
        let mut record = RawRecord::new();
        record.insert("AMT_INCOME_TOTAL", RawValue::Number(202500.0));
        record.insert("NAME_CONTRACT_TYPE", RawValue::Text("Cash loans".to_string()));
        record.insert("FLAG_OWN_CAR", RawValue::Bool(false));
        record.insert("OWN_CAR_AGE", RawValue::Missing);

        let json = serde_json::to_string(&record).unwrap();
        let deserialized: RawRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(record, deserialized);
        assert!(deserialized.get("OWN_CAR_AGE").unwrap().is_missing());
    }

    #[test]
    fn test_missing_serializes_as_null() {
        let json = serde_json::to_string(&RawValue::Missing).unwrap();
        assert_eq!(json, "null");
    }
}
