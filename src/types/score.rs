//! Score results and wire types for score queries.

use crate::types::record::{CustomerId, RawRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary credit decision derived from the default probability and the
/// configured threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Refused,
}

impl Decision {
    /// Apply the threshold. The comparison is inclusive on the refused
    /// side: a probability exactly at the threshold refuses.
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        if probability >= threshold {
            Decision::Refused
        } else {
            Decision::Approved
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approved => "approved",
            Decision::Refused => "refused",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of scoring one feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Probability of payment default, in [0, 1].
    pub probability: f64,
    pub decision: Decision,
}

/// Incoming score query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    #[serde(alias = "SK_ID_CURR")]
    pub sk_id_curr: CustomerId,
}

/// Reply published for every score query.
///
/// Failed queries carry `None` for both score fields, never a partial
/// probability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReply {
    /// Unique reply identifier
    pub reply_id: String,

    /// The queried SK_ID_CURR
    pub customer_id: CustomerId,

    /// Default probability (0.0 - 1.0), absent on failure
    pub probability: Option<f64>,

    /// Decision at the threshold, absent on failure
    pub decision: Option<Decision>,

    /// Threshold the decision was taken at
    pub threshold: f64,

    /// The customer's raw record, for display by the presentation layer
    pub record: Option<RawRecord>,

    /// Failure description, when the query could not be scored
    pub error: Option<String>,

    /// Reply generation timestamp
    pub timestamp: DateTime<Utc>,
}

impl ScoreReply {
    /// Build a reply for a successfully scored query.
    pub fn scored(customer_id: CustomerId, result: ScoreResult, threshold: f64) -> Self {
        Self {
            reply_id: uuid::Uuid::new_v4().to_string(),
            customer_id,
            probability: Some(result.probability),
            decision: Some(result.decision),
            threshold,
            record: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Build a reply for a failed query. Both score fields stay empty.
    pub fn failed(customer_id: CustomerId, threshold: f64, error: impl Into<String>) -> Self {
        Self {
            reply_id: uuid::Uuid::new_v4().to_string(),
            customer_id,
            probability: None,
            decision: None,
            threshold,
            record: None,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the customer's raw record.
    pub fn with_record(mut self, record: RawRecord) -> Self {
        self.record = Some(record);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::RawValue;

    #[test]
    fn test_decision_threshold_inclusive() {
        let threshold = 0.636364;
        assert_eq!(
            Decision::from_probability(threshold, threshold),
            Decision::Refused
        );
        assert_eq!(
            Decision::from_probability(0.636363, threshold),
            Decision::Approved
        );
        assert_eq!(Decision::from_probability(1.0, threshold), Decision::Refused);
        assert_eq!(Decision::from_probability(0.0, threshold), Decision::Approved);
    }

    #[test]
    fn test_score_reply_serialization() {
        let result = ScoreResult {
            probability: 0.72,
            decision: Decision::Refused,
        };
        let mut record = RawRecord::new();
        record.insert("AMT_CREDIT", RawValue::Number(406597.5));

        let reply = ScoreReply::scored(100002, result, 0.636364).with_record(record);

        let json = serde_json::to_string(&reply).unwrap();
        let deserialized: ScoreReply = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.customer_id, 100002);
        assert_eq!(deserialized.probability, Some(0.72));
        assert_eq!(deserialized.decision, Some(Decision::Refused));
        assert!(deserialized.error.is_none());
        assert!(deserialized.record.is_some());
    }

    #[test]
    fn test_failed_reply_has_no_partial_score() {
        let reply = ScoreReply::failed(100002, 0.636364, "prediction failed");
        assert!(reply.probability.is_none());
        assert!(reply.decision.is_none());
        assert_eq!(reply.error.as_deref(), Some("prediction failed"));
    }
}
