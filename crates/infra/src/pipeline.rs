//! Forecast-to-action pipeline orchestration.
//!
//! ```text
//! codes ─▶ resolve ─▶ predict ─▶ forecast ledger
//!                                      │
//!                     inventory ─▶ reorder calculator ─▶ recommendation log
//!
//! (branch, product, on-hand, safety, reorder) ─▶ alert engine ─▶ alerts
//! ```
//!
//! Each stage commits on its own. A failure after the forecast is recorded
//! leaves the forecast in place; there is no cross-stage transaction.
//!
//! This module contains no IO itself; it composes the repository traits.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::instrument;

use novastock_auth::{AccessError, authorize_alert_access};
use novastock_core::{AlertId, BranchId, DomainError, ProductId};
use novastock_forecasting::{DemandFeatures, DemandPredictor, PredictError};
use novastock_restock::{
    Alert, AlertCheck, AlertDecision, AlertSubject, Forecast, InventoryRecord, NewForecast,
    NewRecommendation, ReorderRecommendation, evaluate_low_stock,
};

use crate::identifiers::IdentifierDirectory;
use crate::repositories::{
    AlertRepository, ForecastRepository, InventoryRepository, RecommendationRepository,
    RepositoryError,
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unknown {kind}: '{code}'")]
    UnknownIdentifier { kind: &'static str, code: String },

    #[error("unknown {field} category '{value}'")]
    UnknownCategory { field: &'static str, value: String },

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("no forecast for product {product_id} at branch {branch_id}")]
    NoForecast {
        product_id: ProductId,
        branch_id: BranchId,
    },

    #[error("no inventory record for product {product_id} at branch {branch_id}")]
    NoInventory {
        product_id: ProductId,
        branch_id: BranchId,
    },

    #[error("alert {0} not found")]
    AlertNotFound(AlertId),

    /// The model failed at inference time (broken artifact, not bad input).
    #[error("prediction failed: {0}")]
    Prediction(String),

    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

impl From<DomainError> for PipelineError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                PipelineError::Validation(msg)
            }
            DomainError::UnknownIdentifier { kind, code } => {
                PipelineError::UnknownIdentifier { kind, code }
            }
        }
    }
}

impl From<PredictError> for PipelineError {
    fn from(value: PredictError) -> Self {
        match value {
            PredictError::InvalidFeature { .. } => PipelineError::Validation(value.to_string()),
            PredictError::UnknownCategory { field, value } => {
                PipelineError::UnknownCategory { field, value }
            }
            PredictError::InvalidArtifact(_)
            | PredictError::InferenceFailed(_)
            | PredictError::Io(_) => PipelineError::Prediction(value.to_string()),
        }
    }
}

/// One prediction request, in external codes.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictRequest {
    pub price: f64,
    pub promotion: u8,
    pub branch: String,
    pub product: String,
    pub seasonality: String,
    /// Forecast date; today (UTC) when absent.
    pub forecast_date: Option<NaiveDate>,
}

/// Restock decision service.
///
/// Generic over its four repositories so the same orchestration runs against
/// in-memory stores in tests and Postgres in production.
pub struct RestockService<F, I, R, A> {
    predictor: DemandPredictor,
    directory: Arc<IdentifierDirectory>,
    forecasts: F,
    inventory: I,
    recommendations: R,
    alerts: A,
}

impl<F, I, R, A> core::fmt::Debug for RestockService<F, I, R, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RestockService")
            .field("predictor", &self.predictor)
            .finish_non_exhaustive()
    }
}

impl<F, I, R, A> RestockService<F, I, R, A>
where
    F: ForecastRepository,
    I: InventoryRepository,
    R: RecommendationRepository,
    A: AlertRepository,
{
    pub fn new(
        predictor: DemandPredictor,
        directory: Arc<IdentifierDirectory>,
        forecasts: F,
        inventory: I,
        recommendations: R,
        alerts: A,
    ) -> Self {
        Self {
            predictor,
            directory,
            forecasts,
            inventory,
            recommendations,
            alerts,
        }
    }

    pub fn directory(&self) -> &IdentifierDirectory {
        &self.directory
    }

    pub fn model_version(&self) -> &str {
        self.predictor.model_version()
    }

    /// Predict demand for one (product, branch) and append it to the ledger.
    #[instrument(
        skip(self, request),
        fields(product = %request.product, branch = %request.branch),
        err
    )]
    pub async fn predict(&self, request: PredictRequest) -> Result<Forecast, PipelineError> {
        let PredictRequest {
            price,
            promotion,
            branch,
            product,
            seasonality,
            forecast_date,
        } = request;

        let features = DemandFeatures::new(price, promotion, branch, product, seasonality)?;
        let (product_id, branch_id) = self.directory.resolve(&features.product, &features.branch)?;
        let estimate = self.predictor.predict(&features)?;

        let forecast = NewForecast::new(
            product_id,
            branch_id,
            forecast_date.unwrap_or_else(|| Utc::now().date_naive()),
            estimate.units(),
            self.predictor.model_version(),
        )?;
        let forecast = self.forecasts.record(forecast).await?;

        tracing::info!(
            forecast_id = %forecast.forecast_id,
            predicted_demand = forecast.predicted_demand,
            "forecast recorded"
        );
        Ok(forecast)
    }

    pub async fn forecast_history(
        &self,
        product_code: &str,
        branch_name: &str,
    ) -> Result<Vec<Forecast>, PipelineError> {
        let (product_id, branch_id) = self.directory.resolve(product_code, branch_name)?;
        Ok(self.forecasts.history(product_id, branch_id).await?)
    }

    /// Compute and log a reorder recommendation from codes.
    pub async fn compute_reorder(
        &self,
        product_code: &str,
        branch_name: &str,
    ) -> Result<ReorderRecommendation, PipelineError> {
        let (product_id, branch_id) = self.directory.resolve(product_code, branch_name)?;
        self.compute_reorder_for(product_id, branch_id).await
    }

    #[instrument(skip(self), err)]
    pub async fn compute_reorder_for(
        &self,
        product_id: ProductId,
        branch_id: BranchId,
    ) -> Result<ReorderRecommendation, PipelineError> {
        let forecast = self
            .forecasts
            .latest(product_id, branch_id)
            .await?
            .ok_or(PipelineError::NoForecast {
                product_id,
                branch_id,
            })?;
        let stock = self
            .inventory
            .get(product_id, branch_id)
            .await?
            .ok_or(PipelineError::NoInventory {
                product_id,
                branch_id,
            })?;

        let recommendation = NewRecommendation::compute(&forecast, &stock, Utc::now())?;
        let recommendation = self.recommendations.append(recommendation).await?;

        tracing::info!(
            recommendation_id = %recommendation.recommendation_id,
            predicted_demand = recommendation.predicted_demand,
            quantity_on_hand = recommendation.quantity_on_hand,
            recommended_reorder_quantity = recommendation.recommended_reorder_quantity,
            "reorder recommendation recorded"
        );
        Ok(recommendation)
    }

    pub async fn recommendation_history(
        &self,
        product_code: &str,
        branch_name: &str,
    ) -> Result<Vec<ReorderRecommendation>, PipelineError> {
        let (product_id, branch_id) = self.directory.resolve(product_code, branch_name)?;
        Ok(self.recommendations.history(product_id, branch_id).await?)
    }

    /// Run the low-stock rule and persist an alert when it fires.
    ///
    /// `Ok(None)` is the normal "nothing to report" outcome. Repeated
    /// evaluation of the same condition creates another alert.
    #[instrument(skip(self), err)]
    pub async fn evaluate_alert(&self, check: AlertCheck) -> Result<Option<Alert>, PipelineError> {
        let subject = self.subject_for(check.product_id, check.branch_id);

        match evaluate_low_stock(&check, &subject) {
            AlertDecision::NoAlert => Ok(None),
            AlertDecision::Raise { kind, message } => {
                let alert = Alert::raise(
                    check.branch_id,
                    check.product_id,
                    kind,
                    message,
                    Utc::now(),
                );
                let alert = self.alerts.insert(alert).await?;
                tracing::warn!(
                    alert_id = %alert.alert_id(),
                    kind = %alert.kind(),
                    "low-stock alert raised"
                );
                Ok(Some(alert))
            }
        }
    }

    /// Alerts visible to the caller, most recent first.
    pub async fn list_alerts(
        &self,
        role: &str,
        branch_id: Option<BranchId>,
    ) -> Result<Vec<Alert>, PipelineError> {
        let scope = authorize_alert_access(role, branch_id)?;
        Ok(self.alerts.list(scope).await?)
    }

    /// Acknowledge an alert. Acknowledging twice is not an error.
    #[instrument(skip(self), err)]
    pub async fn mark_alert_read(&self, alert_id: AlertId) -> Result<Alert, PipelineError> {
        self.alerts
            .mark_read(alert_id)
            .await?
            .ok_or(PipelineError::AlertNotFound(alert_id))
    }

    pub async fn branch_inventory(
        &self,
        branch_id: BranchId,
    ) -> Result<Vec<InventoryRecord>, PipelineError> {
        Ok(self.inventory.list_branch(branch_id).await?)
    }

    /// Stock rows of a branch that sit at or below their safety buffer.
    pub async fn low_stock(
        &self,
        branch_id: BranchId,
    ) -> Result<Vec<InventoryRecord>, PipelineError> {
        let mut rows = self.inventory.list_branch(branch_id).await?;
        rows.retain(InventoryRecord::is_at_or_below_safety_stock);
        Ok(rows)
    }

    /// Company-wide low-stock summary, ordered by branch then product.
    pub async fn low_stock_all(&self) -> Result<Vec<InventoryRecord>, PipelineError> {
        let mut rows = self.inventory.list_all().await?;
        rows.retain(InventoryRecord::is_at_or_below_safety_stock);
        Ok(rows)
    }

    fn subject_for(&self, product_id: ProductId, branch_id: BranchId) -> AlertSubject {
        let product = self
            .directory
            .product_code(product_id)
            .map(str::to_string)
            .unwrap_or_else(|| product_id.to_string());
        let branch = self
            .directory
            .branch_name(branch_id)
            .map(str::to_string)
            .unwrap_or_else(|| branch_id.to_string());
        AlertSubject::new(product, branch)
    }
}
