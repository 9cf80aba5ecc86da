//! IsolationForest inference through ONNX Runtime

use crate::models::AnomalyModel;
use crate::types::input::InputVector;
use anyhow::{anyhow, Context, Result};
use ort::session::Session;
use ort::value::Tensor;
use std::sync::Mutex;
use tracing::debug;

/// Anomaly model backed by an ONNX Runtime session.
///
/// Expects the layout skl2onnx produces for an IsolationForest: one float
/// input of shape `[N, 30]`, an int64 label output and a float score output.
pub struct OnnxAnomalyModel {
    /// Running a session needs exclusive access
    session: Mutex<Session>,
    input_name: String,
    label_output: String,
    score_output: String,
}

impl OnnxAnomalyModel {
    pub(crate) fn new(
        session: Session,
        input_name: String,
        label_output: String,
        score_output: String,
    ) -> Self {
        Self {
            session: Mutex::new(session),
            input_name,
            label_output,
            score_output,
        }
    }

    /// Prepare input tensor - shape [1, num_features]
    fn input_tensor(input: &InputVector) -> Result<Tensor<f32>> {
        let row = input.to_f32_row();
        let shape = vec![1_i64, row.len() as i64];
        Tensor::from_array((shape, row)).context("Failed to create input tensor")
    }
}

impl AnomalyModel for OnnxAnomalyModel {
    fn classify(&self, input: &InputVector) -> Result<i64> {
        let tensor = Self::input_tensor(input)?;
        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow!("Lock error: {}", e))?;

        let outputs = session.run(ort::inputs![self.input_name.as_str() => tensor])?;
        let output = outputs
            .get(self.label_output.as_str())
            .ok_or_else(|| anyhow!("Model produced no {:?} output", self.label_output))?;

        let (_, data) = output
            .try_extract_tensor::<i64>()
            .context("Label output is not an int64 tensor")?;
        let label = data
            .first()
            .copied()
            .ok_or_else(|| anyhow!("Label output is empty"))?;

        debug!(label, "Extracted label");
        Ok(label)
    }

    fn score(&self, input: &InputVector) -> Result<f64> {
        let tensor = Self::input_tensor(input)?;
        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow!("Lock error: {}", e))?;

        let outputs = session.run(ort::inputs![self.input_name.as_str() => tensor])?;
        let output = outputs
            .get(self.score_output.as_str())
            .ok_or_else(|| anyhow!("Model produced no {:?} output", self.score_output))?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .context("Score output is not a float tensor")?;
        let score = data
            .first()
            .map(|&v| v as f64)
            .ok_or_else(|| anyhow!("Score output is empty"))?;

        debug!(score, "Extracted anomaly score");
        Ok(score)
    }

    fn name(&self) -> &str {
        "isolation_forest"
    }
}
