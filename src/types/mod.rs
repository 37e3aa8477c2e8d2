//! Type definitions for the credit scoring service

pub mod record;
pub mod score;

pub use record::{CustomerId, RawRecord, RawValue};
pub use score::{Decision, ScoreReply, ScoreRequest, ScoreResult};
