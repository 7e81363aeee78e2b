use serde::{Deserialize, Serialize};
use thiserror::Error;

use novastock_core::MAX_PREDICTED_DEMAND;

/// A bounded demand estimate produced by the predictor.
///
/// Always within `[0, MAX_PREDICTED_DEMAND]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DemandEstimate(u32);

impl DemandEstimate {
    /// Round a raw model output and clamp it into the allowed range.
    ///
    /// Non-finite outputs are rejected; they indicate a broken artifact.
    pub fn from_raw(raw: f64) -> Result<Self, PredictError> {
        if !raw.is_finite() {
            return Err(PredictError::InferenceFailed(format!(
                "model produced a non-finite output ({raw})"
            )));
        }
        let clamped = raw.round().clamp(0.0, f64::from(MAX_PREDICTED_DEMAND));
        Ok(Self(clamped as u32))
    }

    pub fn units(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("invalid feature '{field}': {reason}")]
    InvalidFeature { field: &'static str, reason: String },

    #[error("unknown {field} category '{value}'")]
    UnknownCategory { field: &'static str, value: String },

    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("inference failed: {0}")]
    InferenceFailed(String),

    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),
}

impl PredictError {
    pub fn invalid_feature(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidFeature {
            field,
            reason: reason.into(),
        }
    }
}
