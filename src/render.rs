//! HTML rendering for the predictor page and its result area

use crate::feature_schema::{FeatureGroup, FeatureSchema};
use crate::types::input::InputVector;
use crate::types::prediction::{ScoreOutcome, Verdict};
use anyhow::{Context as _, Result};
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

const PAGE_TEMPLATE: &str = "index.html";

pub const PAGE_TITLE: &str = "💳 Transaction Fraud Detector";
pub const PAGE_INTRO: &str = "Enter the transaction details to predict if it is fraudulent.";

pub const FRAUD_MESSAGE: &str = "🚨 Warning: This transaction is predicted to be FRAUDULENT.";
pub const SAFE_MESSAGE: &str = "✅ This transaction is predicted to be SAFE.";

/// Anomaly score rounded to two decimals
pub fn format_score(score: f64) -> String {
    format!("{:.2}", score)
}

/// Visual style of the result area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Fraud,
    Safe,
    Error,
}

/// What the result area shows after a submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub kind: ResultKind,
    pub message: String,
    pub score_line: Option<String>,
}

impl ResultView {
    pub fn from_outcome(outcome: &ScoreOutcome) -> Self {
        match outcome {
            ScoreOutcome::Scored(prediction) => {
                let score = format_score(prediction.anomaly_score);
                match prediction.verdict {
                    Verdict::Fraudulent => Self {
                        kind: ResultKind::Fraud,
                        message: FRAUD_MESSAGE.to_string(),
                        score_line: Some(format!(
                            "Anomaly Score: {} (More negative indicates higher likelihood of fraud)",
                            score
                        )),
                    },
                    Verdict::Safe => Self {
                        kind: ResultKind::Safe,
                        message: SAFE_MESSAGE.to_string(),
                        score_line: Some(format!("Anomaly Score: {}", score)),
                    },
                }
            }
            ScoreOutcome::Failed { message } => Self {
                kind: ResultKind::Error,
                message: message.clone(),
                score_line: None,
            },
        }
    }
}

#[derive(Serialize)]
struct FieldView {
    name: &'static str,
    min: String,
    max: String,
    value: String,
    hint: String,
}

#[derive(Serialize)]
struct GroupView {
    title: &'static str,
    fields: Vec<FieldView>,
}

/// Values to prefill the form with, keyed by feature name
pub type FieldValues = HashMap<String, String>;

/// Display strings for every feature of `vector`
pub fn field_values(vector: &InputVector) -> FieldValues {
    FeatureSchema::features()
        .iter()
        .zip(vector.values())
        .map(|(spec, &value)| (spec.name.to_string(), spec.display_value(value)))
        .collect()
}

/// Renders the single predictor page
pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(PAGE_TEMPLATE, include_str!("../templates/index.html"))
            .context("Failed to register page template")?;
        Ok(Self { tera })
    }

    /// The form prefilled with `values`, plus an optional input error and result
    pub fn render_form(
        &self,
        values: &FieldValues,
        input_error: Option<&str>,
        result: Option<&ResultView>,
    ) -> Result<String> {
        let mut context = self.base_context();
        context.insert("model_error", &None::<String>);
        context.insert("groups", &Self::groups(values));
        context.insert("input_error", &input_error);
        context.insert("result", &result);
        self.render(&context)
    }

    /// Page shown instead of the form when no model is available
    pub fn render_unavailable(&self, message: &str) -> Result<String> {
        let mut context = self.base_context();
        context.insert("model_error", message);
        context.insert("groups", &Vec::<GroupView>::new());
        context.insert("input_error", &None::<String>);
        context.insert("result", &None::<ResultView>);
        self.render(&context)
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("title", PAGE_TITLE);
        context.insert("intro", PAGE_INTRO);
        context
    }

    fn render(&self, context: &Context) -> Result<String> {
        self.tera
            .render(PAGE_TEMPLATE, context)
            .context("Failed to render page")
    }

    fn groups(values: &FieldValues) -> Vec<GroupView> {
        [FeatureGroup::TransactionDetails, FeatureGroup::Reduced]
            .into_iter()
            .map(|group| GroupView {
                title: group.title(),
                fields: FeatureSchema::group(group)
                    .map(|spec| FieldView {
                        name: spec.name,
                        min: format!("{:?}", spec.min),
                        max: format!("{:?}", spec.max),
                        value: values
                            .get(spec.name)
                            .cloned()
                            .unwrap_or_else(|| spec.display_value(spec.default_value())),
                        hint: spec.range_hint(),
                    })
                    .collect(),
            })
            .collect()
    }
}
