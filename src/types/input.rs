//! Model input vector

use crate::feature_schema::FeatureSchema;
use serde::Serialize;
use serde::ser::SerializeMap;

/// One value per schema feature, always in schema order.
///
/// Only constructed by the schema and the input collector, so the key order
/// never drifts from the order the model was trained on.
#[derive(Debug, Clone, PartialEq)]
pub struct InputVector {
    values: Vec<f64>,
}

impl InputVector {
    pub(crate) fn from_schema_values(values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), FeatureSchema::len());
        Self { values }
    }

    /// Feature names, in the same order as [`InputVector::values`]
    pub fn keys(&self) -> impl Iterator<Item = &'static str> {
        FeatureSchema::names()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `(name, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.keys().zip(self.values.iter().copied())
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.iter().find(|(k, _)| *k == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Single-row `f32` feature buffer for ONNX input
    pub fn to_f32_row(&self) -> Vec<f32> {
        self.values.iter().map(|&v| v as f32).collect()
    }
}

impl Serialize for InputVector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_vector() {
        let vector = FeatureSchema::defaults();
        assert_eq!(vector.len(), 30);
        assert_eq!(vector.get("V1"), Some(-34.14823365));
        assert_eq!(vector.to_f32_row().len(), 30);
    }

    #[test]
    fn test_serializes_in_schema_order() {
        let json = serde_json::to_string(&FeatureSchema::defaults()).unwrap();
        let time = json.find("\"Time\"").unwrap();
        let v1 = json.find("\"V1\"").unwrap();
        let amount = json.find("\"Amount\"").unwrap();
        assert!(time < v1 && v1 < amount);
    }
}
