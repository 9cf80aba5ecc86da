//! Transaction Fraud Predictor Library
//!
//! A single-page form that scores one card transaction with a pre-trained
//! IsolationForest and reports a fraud verdict with its anomaly score.

pub mod config;
pub mod feature_schema;
pub mod metrics;
pub mod models;
pub mod render;
pub mod scorer;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use feature_schema::{FeatureSchema, InputCollector};
pub use models::{AnomalyModel, ModelError, ModelLoader};
pub use scorer::Scorer;
pub use server::{app, AppState};
pub use types::{InputVector, Prediction, ScoreOutcome, Verdict};
