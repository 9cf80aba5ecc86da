//! Feature schema and form input collection.
//!
//! The schema lists the 30 features in the exact order the model was
//! trained on, each with the `[min, max]` range observed in training data.
//! [`InputCollector`] turns submitted form fields into an [`InputVector`]
//! that always follows that order.

use crate::types::input::InputVector;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Display section a feature belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureGroup {
    /// Raw transaction fields (`Time`, `Amount`)
    TransactionDetails,
    /// PCA-anonymized components `V1`..`V28`
    Reduced,
}

impl FeatureGroup {
    /// Section heading shown above the group's inputs
    pub fn title(&self) -> &'static str {
        match self {
            FeatureGroup::TransactionDetails => "Transaction Details",
            FeatureGroup::Reduced => "Dimensionality Reduction Features (V-columns)",
        }
    }
}

/// One named, bounded numeric feature
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub group: FeatureGroup,
}

impl FeatureSpec {
    const fn details(name: &'static str, min: f64, max: f64) -> Self {
        Self {
            name,
            min,
            max,
            group: FeatureGroup::TransactionDetails,
        }
    }

    const fn reduced(name: &'static str, min: f64, max: f64) -> Self {
        Self {
            name,
            min,
            max,
            group: FeatureGroup::Reduced,
        }
    }

    /// Value the form starts with
    pub fn default_value(&self) -> f64 {
        self.min
    }

    /// Bound a value to this feature's range
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Help text shown next to the input.
    ///
    /// V-columns carry eight decimals; transaction details use the shortest
    /// representation.
    pub fn range_hint(&self) -> String {
        match self.group {
            FeatureGroup::TransactionDetails => {
                format!("Range: {:?} to {:?}", self.min, self.max)
            }
            FeatureGroup::Reduced => format!("Range: {:.8} to {:.8}", self.min, self.max),
        }
    }

    /// Render a value the way the input field displays it
    pub fn display_value(&self, value: f64) -> String {
        match self.group {
            FeatureGroup::TransactionDetails => format!("{:.2}", value),
            FeatureGroup::Reduced => format!("{:.8}", value),
        }
    }
}

/// Training-order feature table with ranges from the credit card dataset
static FEATURES: [FeatureSpec; 30] = [
    FeatureSpec::details("Time", 0.0, 172782.0),
    FeatureSpec::reduced("V1", -34.14823365, 2.43920748),
    FeatureSpec::reduced("V2", -48.06085602, 21.46720299),
    FeatureSpec::reduced("V3", -33.68098402, 9.38255843),
    FeatureSpec::reduced("V4", -5.56011758, 12.69954198),
    FeatureSpec::reduced("V5", -23.66972569, 29.01612354),
    FeatureSpec::reduced("V6", -20.86962619, 16.4932271),
    FeatureSpec::reduced("V7", -41.50679608, 21.43751446),
    FeatureSpec::reduced("V8", -50.42009006, 19.16832739),
    FeatureSpec::reduced("V9", -13.43406632, 15.59499461),
    FeatureSpec::reduced("V10", -24.40318497, 23.74513612),
    FeatureSpec::reduced("V11", -4.68293055, 11.61972348),
    FeatureSpec::reduced("V12", -18.43113103, 4.84645241),
    FeatureSpec::reduced("V13", -4.00863979, 4.0993519),
    FeatureSpec::reduced("V14", -18.82208674, 7.75459875),
    FeatureSpec::reduced("V15", -4.49894468, 4.1985829),
    FeatureSpec::reduced("V16", -13.25154198, 4.7343215),
    FeatureSpec::reduced("V17", -22.88399858, 7.73345628),
    FeatureSpec::reduced("V18", -9.28783221, 4.09343996),
    FeatureSpec::reduced("V19", -4.93273306, 4.47512691),
    FeatureSpec::reduced("V20", -21.53382174, 14.93500045),
    FeatureSpec::reduced("V21", -22.88934704, 27.20283916),
    FeatureSpec::reduced("V22", -8.88701714, 8.36198519),
    FeatureSpec::reduced("V23", -22.57500044, 22.08354487),
    FeatureSpec::reduced("V24", -2.8248489, 3.99064595),
    FeatureSpec::reduced("V25", -3.96345399, 6.07085038),
    FeatureSpec::reduced("V26", -2.06856087, 3.00445539),
    FeatureSpec::reduced("V27", -22.56567932, 9.20088257),
    FeatureSpec::reduced("V28", -11.71089564, 15.94215098),
    FeatureSpec::details("Amount", 0.0, 5239.5),
];

/// Accessor for the fixed feature table
pub struct FeatureSchema;

impl FeatureSchema {
    /// All features in training order
    pub fn features() -> &'static [FeatureSpec] {
        &FEATURES
    }

    pub fn len() -> usize {
        FEATURES.len()
    }

    /// Feature names in training order
    pub fn names() -> impl Iterator<Item = &'static str> {
        FEATURES.iter().map(|f| f.name)
    }

    pub fn get(name: &str) -> Option<&'static FeatureSpec> {
        FEATURES.iter().find(|f| f.name == name)
    }

    /// Features of one display group, in schema order
    pub fn group(group: FeatureGroup) -> impl Iterator<Item = &'static FeatureSpec> {
        FEATURES.iter().filter(move |f| f.group == group)
    }

    /// Vector holding every feature's default value
    pub fn defaults() -> InputVector {
        InputVector::from_schema_values(FEATURES.iter().map(|f| f.default_value()).collect())
    }
}

/// Rejected form input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{feature} must be a finite number, got {raw:?}")]
    InvalidNumber { feature: &'static str, raw: String },
}

/// Builds model input vectors from submitted form fields.
pub struct InputCollector;

impl InputCollector {
    pub fn new() -> Self {
        Self
    }

    /// Collect one value per schema feature, in schema order.
    ///
    /// Missing or blank fields take the feature default; out-of-range values
    /// are clamped to the nearest bound. Unknown fields are ignored.
    pub fn collect(&self, fields: &HashMap<String, String>) -> Result<InputVector, InputError> {
        let mut values = Vec::with_capacity(FeatureSchema::len());

        for spec in FeatureSchema::features() {
            let raw = fields.get(spec.name).map(|s| s.trim()).unwrap_or("");
            let value = if raw.is_empty() {
                spec.default_value()
            } else {
                parse_value(spec, raw)?
            };

            if !spec.contains(value) {
                debug!(
                    feature = spec.name,
                    value,
                    min = spec.min,
                    max = spec.max,
                    "Clamping out-of-range input"
                );
            }
            values.push(spec.clamp(value));
        }

        Ok(InputVector::from_schema_values(values))
    }
}

impl Default for InputCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_value(spec: &FeatureSpec, raw: &str) -> Result<f64, InputError> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(InputError::InvalidNumber {
            feature: spec.name,
            raw: raw.to_string(),
        }),
    }
}
