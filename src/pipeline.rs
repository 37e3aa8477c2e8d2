//! Scoring pipeline context.
//!
//! All loaded-once state lives here: schema, dataset, fitted normalizer,
//! model, and scorer, built explicitly at startup and read-only
//! afterwards. The context is shared across workers without locking;
//! each query runs lookup, normalize, score and completes or fails
//! atomically.

use crate::dataset::CustomerDataset;
use crate::error::ScoringError;
use crate::models::scorer::{ProbabilityModel, Scorer};
use crate::normalizer::RecordNormalizer;
use crate::schema::FeatureSchema;
use crate::types::{CustomerId, RawRecord, ScoreResult};

/// A scored customer: the raw record plus the score outcome.
#[derive(Debug, Clone)]
pub struct CustomerScore {
    pub customer_id: CustomerId,
    pub record: RawRecord,
    pub result: ScoreResult,
}

pub struct ScoringContext {
    schema: FeatureSchema,
    dataset: CustomerDataset,
    normalizer: RecordNormalizer,
    model: Box<dyn ProbabilityModel>,
    scorer: Scorer,
}

impl ScoringContext {
    pub fn new(
        schema: FeatureSchema,
        dataset: CustomerDataset,
        normalizer: RecordNormalizer,
        model: Box<dyn ProbabilityModel>,
        scorer: Scorer,
    ) -> Self {
        Self {
            schema,
            dataset,
            normalizer,
            model,
            scorer,
        }
    }

    /// Score one customer by identifier.
    ///
    /// An unknown id fails here; normalization and the model never run
    /// for it.
    pub fn score_customer(&self, customer_id: CustomerId) -> Result<CustomerScore, ScoringError> {
        let record = self
            .dataset
            .get(customer_id)
            .ok_or(ScoringError::RecordNotFound(customer_id))?;

        let features = self.normalizer.normalize(record, &self.schema)?;
        let result = self.scorer.score(self.model.as_ref(), &features)?;

        Ok(CustomerScore {
            customer_id,
            record: record.clone(),
            result,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn dataset(&self) -> &CustomerDataset {
        &self.dataset
    }

    pub fn threshold(&self) -> f64 {
        self.scorer.threshold()
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }
}
