//! Inference through ONNX Runtime against a small fixture model
//!
//! `fixtures/sum_sign_model.onnx` has the IsolationForest export layout:
//! `scores` is the row sum and `label` its sign.

use fraud_predictor::config::ModelConfig;
use fraud_predictor::models::{AnomalyModel, ModelLoader};
use fraud_predictor::{FeatureSchema, InputCollector, InputVector, Scorer, Verdict};
use std::collections::HashMap;
use std::sync::Arc;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/sum_sign_model.onnx");

fn load() -> Arc<dyn AnomalyModel> {
    Arc::new(ModelLoader::new(&ModelConfig::default()).load(FIXTURE).unwrap())
}

fn vector(value: &str) -> InputVector {
    let fields: HashMap<String, String> = FeatureSchema::names()
        .map(|name| (name.to_string(), value.to_string()))
        .collect();
    InputCollector::new().collect(&fields).unwrap()
}

#[test]
fn classify_and_score_read_model_outputs() {
    let model = load();
    let input = FeatureSchema::defaults();
    let expected: f32 = input.to_f32_row().iter().sum();

    assert_eq!(model.classify(&input).unwrap(), -1);
    let score = model.score(&input).unwrap();
    assert!((score - expected as f64).abs() < 1e-2, "score {} vs {}", score, expected);
}

#[test]
fn zero_row_is_not_anomalous() {
    let model = load();
    let input = vector("0");

    assert_eq!(model.classify(&input).unwrap(), 0);
    assert_eq!(model.score(&input).unwrap(), 0.0);
}

#[test]
fn scorer_runs_onnx_model_end_to_end() {
    let scorer = Scorer::new(load());

    let prediction = scorer.evaluate(&vector("1")).prediction().cloned().unwrap();
    assert_eq!(prediction.label, 1);
    assert_eq!(prediction.verdict, Verdict::Safe);
    assert!((prediction.anomaly_score - 30.0).abs() < 1e-4);

    let prediction = scorer
        .evaluate(&FeatureSchema::defaults())
        .prediction()
        .cloned()
        .unwrap();
    assert_eq!(prediction.verdict, Verdict::Fraudulent);
    assert!(prediction.anomaly_score < 0.0);
}
