//! Record normalization: raw customer rows to schema-ordered feature
//! vectors.
//!
//! Categorical values are encoded with ordinal codes fitted once over the
//! dataset. Per column, distinct text values are sorted lexicographically
//! and coded by rank, so a value's code never depends on the order in
//! which records are processed.

use crate::dataset::CustomerDataset;
use crate::error::ScoringError;
use crate::schema::FeatureSchema;
use crate::types::{RawRecord, RawValue};
use std::collections::{BTreeSet, HashMap};

/// Numeric, schema-ordered representation of a record, ready for
/// scoring.
pub type FeatureVector = Vec<f32>;

/// Converts raw customer records into feature vectors aligned to a
/// schema. Immutable once fitted.
#[derive(Debug, Clone, Default)]
pub struct RecordNormalizer {
    /// Per-column category tables: text value to ordinal code.
    categories: HashMap<String, HashMap<String, f32>>,
}

impl RecordNormalizer {
    /// Fit category tables over the dataset.
    pub fn fit(dataset: &CustomerDataset) -> Self {
        let mut distinct: HashMap<String, BTreeSet<String>> = HashMap::new();
        for record in dataset.records() {
            for (column, value) in record.iter() {
                if let RawValue::Text(text) = value {
                    distinct
                        .entry(column.clone())
                        .or_default()
                        .insert(text.clone());
                }
            }
        }

        let categories = distinct
            .into_iter()
            .map(|(column, values)| {
                let table = values
                    .into_iter()
                    .enumerate()
                    .map(|(code, value)| (value, code as f32))
                    .collect();
                (column, table)
            })
            .collect();

        Self { categories }
    }

    /// Build a normalizer from explicit category tables.
    pub fn with_categories(categories: HashMap<String, HashMap<String, f32>>) -> Self {
        Self { categories }
    }

    /// Number of columns with a fitted category table.
    pub fn category_columns(&self) -> usize {
        self.categories.len()
    }

    /// Align a record to the schema.
    ///
    /// Numbers pass through, booleans become 0/1, missing cells become 0,
    /// text values take their fitted code. Schema names absent from the
    /// record default to 0; record columns absent from the schema are
    /// dropped. The output length always equals the schema length.
    pub fn normalize(
        &self,
        record: &RawRecord,
        schema: &FeatureSchema,
    ) -> Result<FeatureVector, ScoringError> {
        let mut encoded: HashMap<&str, f32> = HashMap::with_capacity(record.len());

        for (column, value) in record.iter() {
            let numeric = match value {
                RawValue::Number(n) => *n as f32,
                RawValue::Bool(b) => {
                    if *b {
                        1.0
                    } else {
                        0.0
                    }
                }
                RawValue::Missing => 0.0,
                RawValue::Text(text) => self
                    .categories
                    .get(column.as_str())
                    .and_then(|table| table.get(text.as_str()))
                    .copied()
                    .ok_or_else(|| ScoringError::MalformedRecord {
                        column: column.clone(),
                        value: text.clone(),
                    })?,
            };
            encoded.insert(column.as_str(), numeric);
        }

        Ok(schema
            .names()
            .iter()
            .map(|name| encoded.get(name.as_str()).copied().unwrap_or(0.0))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[(&str, RawValue)]) -> RawRecord {
        fields
            .iter()
            .map(|(column, value)| (column.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_known_record_aligns_to_schema() {
        let schema = FeatureSchema::from_names(["age", "income"]);
        let normalizer = RecordNormalizer::default();
        let record = record(&[
            ("age", RawValue::Number(30.0)),
            ("income", RawValue::Number(50000.0)),
            ("extra", RawValue::Number(1.0)),
        ]);

        let vector = normalizer.normalize(&record, &schema).unwrap();
        assert_eq!(vector, vec![30.0, 50000.0]);
    }

    #[test]
    fn test_missing_column_defaults_to_zero() {
        let schema = FeatureSchema::from_names(["age", "income"]);
        let normalizer = RecordNormalizer::default();
        let record = record(&[("income", RawValue::Number(50000.0))]);

        let vector = normalizer.normalize(&record, &schema).unwrap();
        assert_eq!(vector, vec![0.0, 50000.0]);
    }

    #[test]
    fn test_length_always_matches_schema() {
        let schema = FeatureSchema::from_names(["a", "b", "c", "d"]);
        let normalizer = RecordNormalizer::default();
        let record = record(&[
            ("b", RawValue::Number(2.0)),
            ("x", RawValue::Number(9.0)),
            ("y", RawValue::Number(8.0)),
        ]);

        let vector = normalizer.normalize(&record, &schema).unwrap();
        assert_eq!(vector.len(), schema.len());
        assert_eq!(vector, vec![0.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let mut table = HashMap::new();
        table.insert("Cash loans".to_string(), 0.0);
        table.insert("Revolving loans".to_string(), 1.0);
        let mut categories = HashMap::new();
        categories.insert("NAME_CONTRACT_TYPE".to_string(), table);

        let schema = FeatureSchema::from_names(["NAME_CONTRACT_TYPE", "AMT_CREDIT"]);
        let normalizer = RecordNormalizer::with_categories(categories);
        let record = record(&[
            ("NAME_CONTRACT_TYPE", RawValue::Text("Revolving loans".to_string())),
            ("AMT_CREDIT", RawValue::Number(406597.5)),
        ]);

        let first = normalizer.normalize(&record, &schema).unwrap();
        let second = normalizer.normalize(&record, &schema).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, vec![1.0, 406597.5]);
    }

    #[test]
    fn test_bool_and_missing_values() {
        let schema = FeatureSchema::from_names(["FLAG_OWN_CAR", "OWN_CAR_AGE"]);
        let normalizer = RecordNormalizer::default();
        let record = record(&[
            ("FLAG_OWN_CAR", RawValue::Bool(true)),
            ("OWN_CAR_AGE", RawValue::Missing),
        ]);

        let vector = normalizer.normalize(&record, &schema).unwrap();
        assert_eq!(vector, vec![1.0, 0.0]);
    }

    #[test]
    fn test_unknown_category_is_malformed() {
        let schema = FeatureSchema::from_names(["NAME_CONTRACT_TYPE"]);
        let normalizer = RecordNormalizer::default();
        let record = record(&[(
            "NAME_CONTRACT_TYPE",
            RawValue::Text("Leasing".to_string()),
        )]);

        let err = normalizer.normalize(&record, &schema).unwrap_err();
        match err {
            ScoringError::MalformedRecord { column, value } => {
                assert_eq!(column, "NAME_CONTRACT_TYPE");
                assert_eq!(value, "Leasing");
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_fit_assigns_codes_in_sorted_order() {
        let csv = "\
SK_ID_CURR,NAME_CONTRACT_TYPE
100001,Revolving loans
100002,Cash loans
100003,Revolving loans
";
        let dataset = CustomerDataset::from_reader(csv.as_bytes(), "SK_ID_CURR").unwrap();
        let normalizer = RecordNormalizer::fit(&dataset);
        let schema = FeatureSchema::from_names(["NAME_CONTRACT_TYPE"]);

        // Codes follow lexicographic rank, not encounter order.
        let cash = record(&[(
            "NAME_CONTRACT_TYPE",
            RawValue::Text("Cash loans".to_string()),
        )]);
        let revolving = record(&[(
            "NAME_CONTRACT_TYPE",
            RawValue::Text("Revolving loans".to_string()),
        )]);

        assert_eq!(normalizer.normalize(&cash, &schema).unwrap(), vec![0.0]);
        assert_eq!(
            normalizer.normalize(&revolving, &schema).unwrap(),
            vec![1.0]
        );
    }
}
