use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::encoder::CategoricalEncoders;
use crate::features::{DemandFeatures, FEATURE_COUNT};
use crate::forest::RegressionForest;
use crate::result::{DemandEstimate, PredictError};

/// A loaded, read-only demand model.
///
/// Implementations are immutable after construction; swapping a model is a
/// deployment event, not a runtime operation.
pub trait DemandModel: Send + Sync + 'static {
    /// Label carried into every forecast produced by this model.
    fn model_version(&self) -> &str;

    /// Encode features and run inference. Must not mutate state.
    fn predict(&self, features: &DemandFeatures) -> Result<DemandEstimate, PredictError>;
}

/// Serialized model artifact: encoders plus a regression forest.
///
/// Produced by the offline training job as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default = "default_model_version")]
    pub model_version: String,
    pub encoders: CategoricalEncoders,
    pub forest: RegressionForest,
}

fn default_model_version() -> String {
    "v1.0".to_string()
}

impl ModelArtifact {
    pub fn from_json_str(json: &str) -> Result<Self, PredictError> {
        let artifact: ModelArtifact = serde_json::from_str(json)
            .map_err(|e| PredictError::InvalidArtifact(format!("malformed artifact json: {e}")))?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PredictError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let artifact = Self::from_json_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            model_version = %artifact.model_version,
            trees = artifact.forest.tree_count(),
            "loaded demand model artifact"
        );
        Ok(artifact)
    }

    fn validate(&self) -> Result<(), PredictError> {
        if self.model_version.trim().is_empty() {
            return Err(PredictError::InvalidArtifact(
                "model_version cannot be empty".to_string(),
            ));
        }
        self.forest.validate()
    }

    /// Feature vector layout used at training time:
    /// `[price, promotion, branch, product, seasonality]`.
    fn encode(&self, features: &DemandFeatures) -> Result<[f64; FEATURE_COUNT], PredictError> {
        Ok([
            features.price,
            if features.promotion { 1.0 } else { 0.0 },
            self.encoders.branch.encode("branch", &features.branch)?,
            self.encoders.product.encode("product", &features.product)?,
            self.encoders
                .seasonality
                .encode("seasonality", &features.seasonality)?,
        ])
    }
}

impl DemandModel for ModelArtifact {
    fn model_version(&self) -> &str {
        &self.model_version
    }

    fn predict(&self, features: &DemandFeatures) -> Result<DemandEstimate, PredictError> {
        let x = self.encode(features)?;
        DemandEstimate::from_raw(self.forest.predict(&x))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Small two-tree artifact used across this crate's tests.
    pub(crate) const SAMPLE_ARTIFACT: &str = r#"{
        "model_version": "v1.0",
        "encoders": {
            "branch": ["Colombo", "Galle", "Kandy"],
            "product_id": ["P0001", "P0002", "P0003"],
            "seasonality": ["Autumn", "Spring", "Summer", "Winter"]
        },
        "forest": {
            "trees": [
                { "nodes": [
                    { "kind": "split", "feature": 0, "threshold": 30.0, "left": 1, "right": 2 },
                    { "kind": "leaf", "value": 140.0 },
                    { "kind": "leaf", "value": 60.0 }
                ] },
                { "nodes": [
                    { "kind": "split", "feature": 1, "threshold": 0.5, "left": 1, "right": 2 },
                    { "kind": "leaf", "value": 80.0 },
                    { "kind": "split", "feature": 4, "threshold": 2.5, "left": 3, "right": 4 },
                    { "kind": "leaf", "value": 100.0 },
                    { "kind": "leaf", "value": 130.0 }
                ] }
            ]
        }
    }"#;

    pub(crate) fn sample() -> ModelArtifact {
        ModelArtifact::from_json_str(SAMPLE_ARTIFACT).unwrap()
    }

    #[test]
    fn predicts_from_encoded_features() {
        let model = sample();
        let f = DemandFeatures::new(25.0, 1, "Colombo", "P0001", "Winter").unwrap();
        // tree 1: price 25 <= 30 -> 140; tree 2: promo -> seasonality Winter(3) > 2.5 -> 130
        assert_eq!(model.predict(&f).unwrap().units(), 135);
        assert_eq!(model.model_version(), "v1.0");
    }

    #[test]
    fn unseen_product_is_unknown_category() {
        let model = sample();
        let f = DemandFeatures::new(25.0, 0, "Colombo", "P9999", "Winter").unwrap();
        assert!(matches!(
            model.predict(&f),
            Err(PredictError::UnknownCategory { field: "product", .. })
        ));
    }

    #[test]
    fn model_version_defaults_when_absent() {
        let json = SAMPLE_ARTIFACT.replace(r#""model_version": "v1.0","#, "");
        let model = ModelArtifact::from_json_str(&json).unwrap();
        assert_eq!(model.model_version, "v1.0");
    }

    #[test]
    fn structurally_broken_forest_is_rejected_at_load() {
        let json = SAMPLE_ARTIFACT.replace(r#""right": 2 },"#, r#""right": 9 },"#);
        assert!(matches!(
            ModelArtifact::from_json_str(&json),
            Err(PredictError::InvalidArtifact(_))
        ));
    }
}
