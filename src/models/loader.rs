//! ONNX model loading and probability extraction.

use crate::error::ScoringError;
use crate::models::scorer::ProbabilityModel;
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session, SessionOutputs};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType};
use std::path::Path;
use std::sync::RwLock;
use tracing::{debug, info};

/// ONNX-backed probability model.
///
/// The session is validated at load time: a model exposing no
/// recognizable probability output is rejected with `UnsupportedModel`
/// before any query runs. Handles both tensor outputs (RandomForest,
/// XGBoost exports) and seq(map) outputs (zipmap-style exports).
pub struct OnnxModel {
    name: String,
    /// Running a session requires exclusive access.
    session: RwLock<Session>,
    input_name: String,
    output_name: String,
}

impl std::fmt::Debug for OnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxModel")
            .field("name", &self.name)
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .finish_non_exhaustive()
    }
}

impl OnnxModel {
    /// Load a model from an ONNX file and verify its capability.
    pub fn load<P: AsRef<Path>>(
        path: P,
        name: &str,
        onnx_threads: usize,
    ) -> Result<Self, ScoringError> {
        let path = path.as_ref();

        ort::init()
            .commit()
            .map_err(|e| ScoringError::resource("ONNX runtime", e))?;

        info!(
            model = %name,
            path = %path.display(),
            threads = onnx_threads,
            "Loading ONNX model"
        );

        let session = Session::builder()
            .and_then(|builder| builder.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|builder| builder.with_intra_threads(onnx_threads))
            .and_then(|builder| builder.commit_from_file(path))
            .map_err(|e| ScoringError::resource(format!("model {}", path.display()), e))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| {
                ScoringError::UnsupportedModel(format!("model '{name}' exposes no inputs"))
            })?;

        // The capability check: an output that can carry class
        // probabilities must exist, by name or as the sole non-label
        // output. No silent fallback at prediction time.
        let output_name = session
            .outputs
            .iter()
            .find(|output| output.name.contains("prob") || output.name.contains("output"))
            .or_else(|| {
                session
                    .outputs
                    .iter()
                    .find(|output| !output.name.contains("label"))
            })
            .map(|output| output.name.clone())
            .ok_or_else(|| {
                ScoringError::UnsupportedModel(format!(
                    "model '{name}' exposes no probability output"
                ))
            })?;

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            "Model loaded"
        );

        Ok(Self {
            name: name.to_string(),
            session: RwLock::new(session),
            input_name,
            output_name,
        })
    }

    fn prediction_error(&self, reason: impl ToString) -> ScoringError {
        ScoringError::prediction(&self.name, reason)
    }

    /// Extract the positive-class probability from session outputs.
    fn extract_probability(&self, outputs: &SessionOutputs) -> Result<f64, ScoringError> {
        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            self.prediction_error(format!("output '{}' missing from run", self.output_name))
        })?;

        // Tensor format: [batch, n_classes] or [n_classes].
        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let probability = self.positive_class_from_tensor(&shape, data)?;
            debug!(model = %self.name, probability, "Extracted from tensor");
            return Ok(probability);
        }

        // seq(map(int64, float)) format, one map per batch row.
        if DynSequenceValueType::can_downcast(&output.dtype()) {
            let probability = self.positive_class_from_sequence(output)?;
            debug!(model = %self.name, probability, "Extracted from seq(map)");
            return Ok(probability);
        }

        Err(self.prediction_error(format!(
            "output '{}' has an unsupported value type",
            self.output_name
        )))
    }

    fn positive_class_from_tensor(
        &self,
        shape: &ort::tensor::Shape,
        data: &[f32],
    ) -> Result<f64, ScoringError> {
        let dims: Vec<i64> = shape.iter().copied().collect();
        let classes = match dims.as_slice() {
            [_, classes] => *classes as usize,
            [classes] => *classes as usize,
            _ => 0,
        };

        match classes {
            n if n >= 2 && data.len() >= 2 => Ok(data[1] as f64),
            1 if !data.is_empty() => Ok(data[0] as f64),
            _ => Err(self.prediction_error(format!("unexpected output shape {dims:?}"))),
        }
    }

    fn positive_class_from_sequence(
        &self,
        output: &ort::value::DynValue,
    ) -> Result<f64, ScoringError> {
        let allocator = Allocator::default();

        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(|e| self.prediction_error(format!("not a sequence output: {e}")))?;

        let maps = sequence
            .try_extract_sequence::<DynMapValueType>(&allocator)
            .map_err(|e| self.prediction_error(e))?;

        let map_value = maps
            .first()
            .ok_or_else(|| self.prediction_error("empty output sequence"))?;

        let kv_pairs = map_value
            .try_extract_key_values::<i64, f32>()
            .map_err(|e| self.prediction_error(e))?;

        for (class, probability) in &kv_pairs {
            if *class == 1 {
                return Ok(*probability as f64);
            }
        }
        // Some binary exports only emit class 0.
        for (class, probability) in &kv_pairs {
            if *class == 0 {
                return Ok(1.0 - *probability as f64);
            }
        }

        Err(self.prediction_error("no class probability in output map"))
    }
}

impl ProbabilityModel for OnnxModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict_probability(&self, features: &[f32]) -> Result<f64, ScoringError> {
        use ort::value::Tensor;

        // Input tensor shape [1, num_features].
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))
            .map_err(|e| self.prediction_error(format!("failed to create input tensor: {e}")))?;

        let mut session = self
            .session
            .write()
            .map_err(|e| self.prediction_error(format!("session lock poisoned: {e}")))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_tensor])
            .map_err(|e| self.prediction_error(e))?;

        self.extract_probability(&outputs)
    }
}
