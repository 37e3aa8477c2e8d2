//! Feature schema store.
//!
//! The schema is the ordered list of feature names the model was trained
//! on; position in the list defines position in the feature vector, so
//! order is semantically significant and duplicates are preserved as
//! given.

use crate::error::ScoringError;
use std::fs;
use std::path::Path;
use tracing::info;

/// Ordered feature names, immutable after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    /// Load the schema from a text resource with one feature name per
    /// line. Failing to read the resource is fatal for any downstream
    /// prediction.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScoringError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ScoringError::resource(format!("feature schema {}", path.display()), e)
        })?;

        let schema = Self::parse(&text);
        info!(
            path = %path.display(),
            features = schema.len(),
            "Feature schema loaded"
        );
        Ok(schema)
    }

    /// Parse schema text. Blank lines carry no feature name and are
    /// skipped; everything else is kept verbatim, in order.
    pub fn parse(text: &str) -> Self {
        let names = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        Self { names }
    }

    /// Build a schema from an explicit name list.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.names.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_order_and_duplicates() {
        let schema = FeatureSchema::parse("AMT_CREDIT\nAMT_ANNUITY\n\nAMT_CREDIT\n");
        assert_eq!(
            schema.names(),
            &["AMT_CREDIT", "AMT_ANNUITY", "AMT_CREDIT"]
        );
    }

    #[test]
    fn test_parse_trims_carriage_returns() {
        let schema = FeatureSchema::parse("age\r\nincome\r\n");
        assert_eq!(schema.names(), &["age", "income"]);
    }

    #[test]
    fn test_parse_empty_text() {
        let schema = FeatureSchema::parse("\n\n");
        assert!(schema.is_empty());
    }

    #[test]
    fn test_load_missing_resource_is_unavailable() {
        let err = FeatureSchema::load("no/such/feature_names.txt").unwrap_err();
        assert!(matches!(err, ScoringError::ResourceUnavailable { .. }));
    }
}
