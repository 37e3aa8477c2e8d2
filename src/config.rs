//! Configuration management for the credit scoring service

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nats: NatsConfig,
    pub data: DataConfig,
    pub model: ModelConfig,
    pub scoring: ScoringConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// NATS connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Subject for incoming score requests
    pub request_subject: String,
    /// Subject for score replies without a reply-to
    pub result_subject: String,
}

/// Data resources configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Customer dataset CSV
    pub dataset_path: String,
    /// Feature-name list, one name per line
    pub feature_names_path: String,
    /// Optional column-descriptions CSV (display-only)
    #[serde(default)]
    pub descriptions_path: Option<String>,
    /// Identifier column in the dataset
    #[serde(default = "default_id_column")]
    pub id_column: String,
}

/// Model configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// ONNX model file
    pub path: String,
    /// Model name used in logs and errors
    #[serde(default = "default_model_name")]
    pub name: String,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

/// Scoring configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Probability cutoff; >= threshold refuses
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Number of concurrent query workers
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

fn default_id_column() -> String {
    "SK_ID_CURR".to_string()
}

fn default_model_name() -> String {
    "random_forest".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

fn default_threshold() -> f64 {
    // Optimal cutoff from threshold tuning on the validation split
    0.636364
}

fn default_workers() -> usize {
    4
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                request_subject: "scoring.requests".to_string(),
                result_subject: "scoring.results".to_string(),
            },
            data: DataConfig {
                dataset_path: "data/application_test.csv".to_string(),
                feature_names_path: "data/feature_names.txt".to_string(),
                descriptions_path: None,
                id_column: default_id_column(),
            },
            model: ModelConfig {
                path: "models/model.onnx".to_string(),
                name: default_model_name(),
                onnx_threads: default_onnx_threads(),
            },
            scoring: ScoringConfig {
                threshold: default_threshold(),
            },
            pipeline: PipelineConfig {
                workers: default_workers(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.nats.url, "nats://localhost:4222");
        assert_eq!(config.scoring.threshold, 0.636364);
        assert_eq!(config.data.id_column, "SK_ID_CURR");
        assert_eq!(config.pipeline.workers, 4);
        assert_eq!(config.model.onnx_threads, 1);
    }

    #[test]
    fn test_missing_config_file_fails() {
        assert!(AppConfig::load_from_path("no/such/config.toml").is_err());
    }
}
