use std::sync::Arc;

use crate::features::DemandFeatures;
use crate::model::DemandModel;
use crate::result::{DemandEstimate, PredictError};

/// Shared, read-only handle to the loaded demand model.
///
/// Cloning is cheap; every clone points at the same immutable artifact, so
/// concurrent requests can predict without synchronization.
#[derive(Clone)]
pub struct DemandPredictor {
    model: Arc<dyn DemandModel>,
}

impl core::fmt::Debug for DemandPredictor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DemandPredictor")
            .field("model_version", &self.model.model_version())
            .finish()
    }
}

impl DemandPredictor {
    pub fn new(model: impl DemandModel) -> Self {
        Self {
            model: Arc::new(model),
        }
    }

    pub fn model_version(&self) -> &str {
        self.model.model_version()
    }

    pub fn predict(&self, features: &DemandFeatures) -> Result<DemandEstimate, PredictError> {
        let estimate = self.model.predict(features)?;
        tracing::debug!(
            branch = %features.branch,
            product = %features.product,
            predicted_demand = estimate.units(),
            model_version = %self.model.model_version(),
            "demand predicted"
        );
        Ok(estimate)
    }
}
