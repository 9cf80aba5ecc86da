//! ONNX model loader

use crate::config::ModelConfig;
use crate::models::onnx::OnnxAnomalyModel;
use crate::models::ModelError;
use anyhow::Context;
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

/// Loader for the anomaly model artifact
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
    input_name: String,
    label_output: String,
    score_output: String,
}

impl ModelLoader {
    /// Create a loader from model configuration
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            onnx_threads: config.onnx_threads.max(1),
            input_name: config.input_name.clone(),
            label_output: config.label_output.clone(),
            score_output: config.score_output.clone(),
        }
    }

    /// Load the model from `path`.
    ///
    /// A missing file is reported separately from one that exists but cannot
    /// be turned into a session.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<OnnxAnomalyModel, ModelError> {
        let path = path.as_ref();

        match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                warn!(path = %path.display(), "Model path is not a file");
                return Err(ModelError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "Model file not found");
                return Err(ModelError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Model file not accessible");
                return Err(ModelError::Unreadable {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }

        info!(path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = self.build_session(path).map_err(|e| ModelError::Unreadable {
            path: path.to_path_buf(),
            reason: format!("{:#}", e),
        })?;

        let input_name = resolve_input(&session, &self.input_name);

        for output in [&self.label_output, &self.score_output] {
            if !session.outputs.iter().any(|o| &o.name == output) {
                return Err(ModelError::Unreadable {
                    path: path.to_path_buf(),
                    reason: format!("model has no output named {:?}", output),
                });
            }
        }

        info!(
            input = %input_name,
            label_output = %self.label_output,
            score_output = %self.score_output,
            "Model loaded successfully"
        );

        Ok(OnnxAnomalyModel::new(
            session,
            input_name,
            self.label_output.clone(),
            self.score_output.clone(),
        ))
    }

    fn build_session(&self, path: &Path) -> anyhow::Result<Session> {
        ort::init().commit()?;

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {:?}", path))?;

        Ok(session)
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new(&ModelConfig::default())
    }
}

/// Prefer the configured input name, else the model's first declared input
fn resolve_input(session: &Session, configured: &str) -> String {
    if session.inputs.iter().any(|i| i.name == configured) {
        return configured.to_string();
    }

    session
        .inputs
        .first()
        .map(|i| i.name.clone())
        .unwrap_or_else(|| configured.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnomalyModel;
    use std::io::Write;

    const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/sum_sign_model.onnx");

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fraud_predictor.onnx");

        match ModelLoader::default().load(&path) {
            Err(ModelError::NotFound { path: reported }) => assert_eq!(reported, path),
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ModelLoader::default().load(dir.path()),
            Err(ModelError::NotFound { .. })
        ));
    }

    #[test]
    fn test_inaccessible_path_is_unreadable() {
        // A regular file used as a directory fails with ENOTDIR, not ENOENT.
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().join("fraud_predictor.onnx");

        assert!(matches!(
            ModelLoader::default().load(&path),
            Err(ModelError::Unreadable { .. })
        ));
    }

    #[test]
    fn test_fixture_loads_and_resolves_names() {
        let model = ModelLoader::default().load(FIXTURE).unwrap();
        assert_eq!(model.name(), "isolation_forest");
    }

    #[test]
    fn test_missing_output_is_rejected() {
        let config = ModelConfig {
            label_output: "predicted_label".to_string(),
            ..ModelConfig::default()
        };

        match ModelLoader::new(&config).load(FIXTURE) {
            Err(ModelError::Unreadable { reason, .. }) => {
                assert!(reason.contains("no output named \"predicted_label\""), "{}", reason)
            }
            other => panic!("expected Unreadable, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_garbage_file_is_unreadable() {
        let mut file = tempfile::Builder::new().suffix(".onnx").tempfile().unwrap();
        file.write_all(b"not a model").unwrap();

        assert!(matches!(
            ModelLoader::default().load(file.path()),
            Err(ModelError::Unreadable { .. })
        ));
    }
}
