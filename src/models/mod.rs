//! Anomaly model interface and ONNX-backed implementation

pub mod loader;
pub mod onnx;

pub use loader::ModelLoader;
pub use onnx::OnnxAnomalyModel;

use crate::types::input::InputVector;
use std::path::PathBuf;
use thiserror::Error;

/// Capability the scorer needs from a pre-trained anomaly detector.
///
/// Implementations are shared read-only across requests.
pub trait AnomalyModel: Send + Sync {
    /// Discrete label for the row: `-1` anomalous, anything else normal
    fn classify(&self, input: &InputVector) -> anyhow::Result<i64>;

    /// Continuous decision-function value; lower is more anomalous
    fn score(&self, input: &InputVector) -> anyhow::Result<f64>;

    /// Short identifier for logs
    fn name(&self) -> &str {
        "anomaly-model"
    }
}

/// Failure to bring the model artifact into memory
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Error: {} model file not found.", file_name(.path))]
    NotFound { path: PathBuf },

    #[error("Error: could not read model file {}: {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_the_file() {
        let err = ModelError::NotFound {
            path: PathBuf::from("models/fraud_predictor.onnx"),
        };
        assert_eq!(
            err.to_string(),
            "Error: fraud_predictor.onnx model file not found."
        );
    }
}
