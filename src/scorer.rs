//! Scores one input vector against the loaded anomaly model

use crate::metrics::PredictionMetrics;
use crate::models::AnomalyModel;
use crate::types::input::InputVector;
use crate::types::prediction::{Prediction, ScoreOutcome};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

/// Message shown to the user when the model call fails
pub const PREDICTION_FAILED_MESSAGE: &str =
    "An error occurred during prediction. Please try again.";

/// Runs the model's classify and score calls for one transaction.
///
/// Holds the single read-only model handle created at startup.
#[derive(Clone)]
pub struct Scorer {
    model: Arc<dyn AnomalyModel>,
    metrics: Arc<PredictionMetrics>,
}

impl Scorer {
    pub fn new(model: Arc<dyn AnomalyModel>) -> Self {
        Self::with_metrics(model, Arc::new(PredictionMetrics::new()))
    }

    pub fn with_metrics(model: Arc<dyn AnomalyModel>, metrics: Arc<PredictionMetrics>) -> Self {
        Self { model, metrics }
    }

    pub fn metrics(&self) -> &Arc<PredictionMetrics> {
        &self.metrics
    }

    /// Classify and score `input`.
    ///
    /// Model errors are logged and turned into [`ScoreOutcome::Failed`];
    /// they never escape this call.
    pub fn evaluate(&self, input: &InputVector) -> ScoreOutcome {
        let start = Instant::now();

        match self.predict(input) {
            Ok(prediction) => {
                self.metrics
                    .record_prediction(start.elapsed(), prediction.verdict);
                debug!(
                    model = self.model.name(),
                    label = prediction.label,
                    anomaly_score = prediction.anomaly_score,
                    verdict = ?prediction.verdict,
                    elapsed_us = start.elapsed().as_micros() as u64,
                    "Transaction scored"
                );
                ScoreOutcome::Scored(prediction)
            }
            Err(e) => {
                self.metrics.record_failure(start.elapsed());
                error!(model = self.model.name(), error = %e, "Inference failed");
                ScoreOutcome::Failed {
                    message: PREDICTION_FAILED_MESSAGE.to_string(),
                }
            }
        }
    }

    fn predict(&self, input: &InputVector) -> anyhow::Result<Prediction> {
        let label = self.model.classify(input)?;
        let anomaly_score = self.model.score(input)?;
        Ok(Prediction::new(label, anomaly_score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_schema::FeatureSchema;
    use crate::types::prediction::Verdict;
    use anyhow::bail;
    use std::sync::atomic::Ordering;
    use std::sync::Mutex;

    struct FixedModel {
        label: i64,
        score: f64,
        seen: Mutex<Vec<Vec<&'static str>>>,
    }

    impl AnomalyModel for FixedModel {
        fn classify(&self, input: &InputVector) -> anyhow::Result<i64> {
            self.seen.lock().unwrap().push(input.keys().collect());
            Ok(self.label)
        }

        fn score(&self, _input: &InputVector) -> anyhow::Result<f64> {
            Ok(self.score)
        }
    }

    struct ScoreFails;

    impl AnomalyModel for ScoreFails {
        fn classify(&self, _input: &InputVector) -> anyhow::Result<i64> {
            Ok(1)
        }

        fn score(&self, _input: &InputVector) -> anyhow::Result<f64> {
            bail!("X has 29 features, but IsolationForest is expecting 30 features")
        }
    }

    #[test]
    fn test_scored_outcome() {
        let model = Arc::new(FixedModel {
            label: -1,
            score: -0.087,
            seen: Mutex::new(Vec::new()),
        });
        let scorer = Scorer::new(model.clone());

        let outcome = scorer.evaluate(&FeatureSchema::defaults());
        let prediction = outcome.prediction().unwrap();
        assert_eq!(prediction.label, -1);
        assert_eq!(prediction.anomaly_score, -0.087);
        assert_eq!(prediction.verdict, Verdict::Fraudulent);

        // The model saw every feature in training order.
        let seen = model.seen.lock().unwrap();
        let expected: Vec<&str> = FeatureSchema::names().collect();
        assert_eq!(seen[0], expected);

        assert_eq!(scorer.metrics().fraudulent.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_model_error_becomes_failed_outcome() {
        let scorer = Scorer::new(Arc::new(ScoreFails));

        let outcome = scorer.evaluate(&FeatureSchema::defaults());
        assert_eq!(
            outcome,
            ScoreOutcome::Failed {
                message: PREDICTION_FAILED_MESSAGE.to_string()
            }
        );
        assert_eq!(scorer.metrics().failures.load(Ordering::Relaxed), 1);

        // Still usable afterwards.
        assert!(scorer.evaluate(&FeatureSchema::defaults()).prediction().is_none());
        assert_eq!(scorer.metrics().failures.load(Ordering::Relaxed), 2);
    }
}
