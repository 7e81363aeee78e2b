//! Pre-fitted categorical encoders.
//!
//! Encoders map a category to its position in a sorted class list, which is
//! how the offline training job fitted them. The class lists are part of the
//! artifact and never change at runtime.

use serde::{Deserialize, Serialize};

use crate::result::PredictError;

/// Label encoder: category -> index in a sorted, de-duplicated class list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Build an encoder from fitted classes.
    ///
    /// Classes must already be strictly ascending: the model was trained against
    /// these exact positions, so re-sorting would silently change the encoding.
    pub fn new(classes: Vec<String>) -> Result<Self, PredictError> {
        if classes.is_empty() {
            return Err(PredictError::InvalidArtifact(
                "encoder has no classes".to_string(),
            ));
        }
        if let Some(pair) = classes.windows(2).find(|w| w[0] >= w[1]) {
            return Err(PredictError::InvalidArtifact(format!(
                "encoder classes must be strictly ascending ('{}' then '{}')",
                pair[0], pair[1]
            )));
        }
        Ok(Self { classes })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Encode a category, rejecting values unseen during fitting.
    pub fn encode(&self, field: &'static str, value: &str) -> Result<f64, PredictError> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .map(|idx| idx as f64)
            .map_err(|_| PredictError::UnknownCategory {
                field,
                value: value.to_string(),
            })
    }
}

impl TryFrom<Vec<String>> for LabelEncoder {
    type Error = PredictError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LabelEncoder> for Vec<String> {
    fn from(value: LabelEncoder) -> Self {
        value.classes
    }
}

/// The fixed set of encoders shipped with a model artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalEncoders {
    pub branch: LabelEncoder,
    #[serde(alias = "product_id")]
    pub product: LabelEncoder,
    pub seasonality: LabelEncoder,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder(classes: &[&str]) -> LabelEncoder {
        LabelEncoder::new(classes.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn encodes_by_sorted_position() {
        let enc = encoder(&["Colombo", "Galle", "Kandy"]);
        assert_eq!(enc.encode("branch", "Colombo").unwrap(), 0.0);
        assert_eq!(enc.encode("branch", "Kandy").unwrap(), 2.0);
    }

    #[test]
    fn unseen_category_is_rejected() {
        let enc = encoder(&["Autumn", "Spring", "Summer", "Winter"]);
        let err = enc.encode("seasonality", "Monsoon").unwrap_err();
        assert!(matches!(
            err,
            PredictError::UnknownCategory { field: "seasonality", ref value } if value == "Monsoon"
        ));
    }

    #[test]
    fn unsorted_or_duplicate_classes_are_invalid() {
        assert!(LabelEncoder::new(vec!["b".into(), "a".into()]).is_err());
        assert!(LabelEncoder::new(vec!["a".into(), "a".into()]).is_err());
        assert!(LabelEncoder::new(vec![]).is_err());
    }

    #[test]
    fn deserializes_training_key_alias() {
        let json = r#"{
            "branch": ["Colombo"],
            "product_id": ["P0001", "P0002"],
            "seasonality": ["Winter"]
        }"#;
        let encoders: CategoricalEncoders = serde_json::from_str(json).unwrap();
        assert_eq!(encoders.product.classes().len(), 2);
    }
}
