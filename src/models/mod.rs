//! Model loading and scoring components

pub mod loader;
pub mod scorer;

pub use loader::OnnxModel;
pub use scorer::{ProbabilityModel, Scorer};
