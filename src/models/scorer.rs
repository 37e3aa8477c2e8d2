//! Probability model capability and threshold scoring.

use crate::error::ScoringError;
use crate::normalizer::FeatureVector;
use crate::types::{Decision, ScoreResult};

/// Capability abstraction over any predictor exposing positive-class
/// probability for a feature vector.
///
/// Adapters are validated when they are constructed, not per call; a
/// value of this type is always able to attempt a prediction.
pub trait ProbabilityModel: Send + Sync {
    fn name(&self) -> &str;

    /// Probability of the positive (default) class, in [0, 1].
    fn predict_probability(&self, features: &[f32]) -> Result<f64, ScoringError>;
}

/// Applies the decision threshold to model output.
///
/// Stateless aside from the threshold; safe to share across workers.
#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    threshold: f64,
}

impl Scorer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score one feature vector.
    ///
    /// A model error propagates as-is; a probability outside [0, 1] is
    /// rejected rather than passed on. The threshold comparison is
    /// inclusive on the refused side.
    pub fn score(
        &self,
        model: &dyn ProbabilityModel,
        features: &FeatureVector,
    ) -> Result<ScoreResult, ScoringError> {
        let probability = model.predict_probability(features)?;

        if !(0.0..=1.0).contains(&probability) {
            return Err(ScoringError::prediction(
                model.name(),
                format!("probability {probability} outside [0, 1]"),
            ));
        }

        Ok(ScoreResult {
            probability,
            decision: Decision::from_probability(probability, self.threshold),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubModel {
        probability: Result<f64, String>,
    }

    impl StubModel {
        fn returning(probability: f64) -> Self {
            Self {
                probability: Ok(probability),
            }
        }

        fn failing(reason: &str) -> Self {
            Self {
                probability: Err(reason.to_string()),
            }
        }
    }

    impl ProbabilityModel for StubModel {
        fn name(&self) -> &str {
            "stub"
        }

        fn predict_probability(&self, _features: &[f32]) -> Result<f64, ScoringError> {
            self.probability
                .clone()
                .map_err(|reason| ScoringError::prediction("stub", reason))
        }
    }

    #[test]
    fn test_threshold_boundary_is_inclusive_refused() {
        let scorer = Scorer::new(0.636364);
        let features = vec![0.0; 4];

        let at_threshold = scorer
            .score(&StubModel::returning(0.636364), &features)
            .unwrap();
        assert_eq!(at_threshold.decision, Decision::Refused);

        let below_threshold = scorer
            .score(&StubModel::returning(0.636363), &features)
            .unwrap();
        assert_eq!(below_threshold.decision, Decision::Approved);
    }

    #[test]
    fn test_model_failure_yields_no_partial_result() {
        let scorer = Scorer::new(0.636364);
        let err = scorer
            .score(&StubModel::failing("vector length mismatch"), &vec![1.0])
            .unwrap_err();
        assert!(matches!(err, ScoringError::Prediction { .. }));
    }

    #[test]
    fn test_out_of_range_probability_is_rejected() {
        let scorer = Scorer::new(0.5);
        let err = scorer
            .score(&StubModel::returning(1.5), &vec![1.0])
            .unwrap_err();
        assert!(matches!(err, ScoringError::Prediction { .. }));

        let err = scorer
            .score(&StubModel::returning(-0.1), &vec![1.0])
            .unwrap_err();
        assert!(matches!(err, ScoringError::Prediction { .. }));
    }

    #[test]
    fn test_deterministic_given_deterministic_model() {
        let scorer = Scorer::new(0.5);
        let model = StubModel::returning(0.42);
        let features = vec![30.0, 50000.0];

        let first = scorer.score(&model, &features).unwrap();
        let second = scorer.score(&model, &features).unwrap();
        assert_eq!(first.probability, second.probability);
        assert_eq!(first.decision, second.decision);
        assert_eq!(first.decision, Decision::Approved);
    }
}
