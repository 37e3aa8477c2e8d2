//! Error taxonomy for the scoring library.
//!
//! Fatal-at-startup errors (`ResourceUnavailable`, `UnsupportedModel`) are
//! propagated out of `main`; per-query errors are converted into failure
//! replies at the service boundary and never terminate the process.

use crate::types::CustomerId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    /// A required external resource (schema, model, dataset) could not be
    /// loaded. No query can proceed without it.
    #[error("resource unavailable: {resource}: {reason}")]
    ResourceUnavailable { resource: String, reason: String },

    /// The requested identifier has no matching row. A normal negative
    /// lookup result, handled without invoking the model.
    #[error("no customer record for id {0}")]
    RecordNotFound(CustomerId),

    /// A field value could not be coerced to a numeric feature.
    #[error("malformed record: column '{column}' holds unencodable value '{value}'")]
    MalformedRecord { column: String, value: String },

    /// The model does not expose a usable probability output.
    #[error("unsupported model: {0}")]
    UnsupportedModel(String),

    /// The prediction call itself failed.
    #[error("prediction failed for model '{model}': {reason}")]
    Prediction { model: String, reason: String },
}

impl ScoringError {
    pub fn resource(resource: impl Into<String>, reason: impl ToString) -> Self {
        Self::ResourceUnavailable {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }

    pub fn prediction(model: impl Into<String>, reason: impl ToString) -> Self {
        Self::Prediction {
            model: model.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScoringError::RecordNotFound(100001);
        assert_eq!(err.to_string(), "no customer record for id 100001");

        let err = ScoringError::MalformedRecord {
            column: "NAME_CONTRACT_TYPE".to_string(),
            value: "Leasing".to_string(),
        };
        assert!(err.to_string().contains("NAME_CONTRACT_TYPE"));
        assert!(err.to_string().contains("Leasing"));
    }

    #[test]
    fn test_constructors() {
        let err = ScoringError::resource("feature schema data/feature_names.txt", "file not found");
        assert!(matches!(err, ScoringError::ResourceUnavailable { .. }));

        let err = ScoringError::prediction("random_forest", "tensor shape mismatch");
        assert!(matches!(err, ScoringError::Prediction { .. }));
    }
}
