//! Prediction result structures

use serde::Serialize;

/// Label the model emits for an anomalous (fraudulent) row
pub const ANOMALY_LABEL: i64 = -1;

/// Human-facing classification of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Fraudulent,
    Safe,
}

impl Verdict {
    /// `-1` is anomalous; every other label is normal
    pub fn from_label(label: i64) -> Self {
        if label == ANOMALY_LABEL {
            Verdict::Fraudulent
        } else {
            Verdict::Safe
        }
    }

    pub fn is_fraudulent(&self) -> bool {
        matches!(self, Verdict::Fraudulent)
    }
}

/// Successful model output for one transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Raw classifier label
    pub label: i64,
    /// Decision-function value; more negative is more anomalous
    pub anomaly_score: f64,
    pub verdict: Verdict,
}

impl Prediction {
    pub fn new(label: i64, anomaly_score: f64) -> Self {
        Self {
            label,
            anomaly_score,
            verdict: Verdict::from_label(label),
        }
    }
}

/// Result of one scoring attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ScoreOutcome {
    Scored(Prediction),
    Failed { message: String },
}

impl ScoreOutcome {
    pub fn prediction(&self) -> Option<&Prediction> {
        match self {
            ScoreOutcome::Scored(prediction) => Some(prediction),
            ScoreOutcome::Failed { .. } => None,
        }
    }
}
