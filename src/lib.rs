//! Credit Scoring Service Library
//!
//! Loads a pre-trained default-risk classifier, its feature schema, and a
//! customer dataset, then scores customers by identifier: probability of
//! payment default plus an approved/refused decision at a fixed
//! threshold.

pub mod config;
pub mod consumer;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod models;
pub mod normalizer;
pub mod pipeline;
pub mod producer;
pub mod schema;
pub mod types;

pub use config::AppConfig;
pub use consumer::ScoreRequestConsumer;
pub use dataset::{ColumnDescriptions, CustomerDataset};
pub use error::ScoringError;
pub use models::{OnnxModel, ProbabilityModel, Scorer};
pub use normalizer::{FeatureVector, RecordNormalizer};
pub use pipeline::{CustomerScore, ScoringContext};
pub use producer::ScoreReplyProducer;
pub use schema::FeatureSchema;
pub use types::{CustomerId, Decision, RawRecord, RawValue, ScoreReply, ScoreRequest, ScoreResult};
