//! `novastock-forecasting`
//!
//! **Responsibility:** demand prediction from a pre-trained artifact.
//!
//! This crate is intentionally **not** part of the restock domain model:
//! - It holds no mutable state after load (artifacts are immutable).
//! - It does not persist anything; callers record forecasts in the ledger.
//! - Training, feature engineering and dataset cleaning happen offline.

pub mod encoder;
pub mod features;
pub mod forest;
pub mod model;
pub mod predictor;
pub mod result;

pub use encoder::{CategoricalEncoders, LabelEncoder};
pub use features::{DemandFeatures, FEATURE_COUNT};
pub use forest::{RegressionForest, RegressionTree, TreeNode};
pub use model::{DemandModel, ModelArtifact};
pub use predictor::DemandPredictor;
pub use result::{DemandEstimate, PredictError};
