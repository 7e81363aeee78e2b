//! Repository abstractions for the restock pipeline.
//!
//! One capability contract per persisted entity. Pipeline components depend on
//! these traits only, so tests run against the in-memory implementations and
//! production runs against Postgres.
//!
//! Write semantics:
//! - forecasts and recommendations are append-only (never updated or deleted)
//! - inventory is read-only from the pipeline's perspective
//! - alerts only ever change by flipping `is_read` to true

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use novastock_auth::AlertScope;
use novastock_core::{AlertId, BranchId, ProductId};
use novastock_restock::{
    Alert, Forecast, InventoryRecord, NewForecast, NewRecommendation, ReorderRecommendation,
};

pub mod in_memory;
pub mod postgres;

pub use in_memory::{
    InMemoryAlertRepository, InMemoryForecastRepository, InMemoryInventoryRepository,
    InMemoryRecommendationRepository,
};
pub use postgres::PostgresRepository;

#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// The store rejected the read/write (connection, constraint, lock poisoning).
    #[error("storage error: {0}")]
    Storage(String),

    /// A stored row could not be mapped back into a domain value.
    #[error("corrupt row: {0}")]
    CorruptRow(String),
}

/// Append-only forecast ledger.
#[async_trait]
pub trait ForecastRepository: Send + Sync {
    /// Append a forecast; the store assigns its sequence number.
    async fn record(&self, forecast: NewForecast) -> Result<Forecast, RepositoryError>;

    /// Current forecast for a key: max date, ties broken by highest sequence number.
    async fn latest(
        &self,
        product_id: ProductId,
        branch_id: BranchId,
    ) -> Result<Option<Forecast>, RepositoryError>;

    /// All forecasts for a key, most recent first.
    async fn history(
        &self,
        product_id: ProductId,
        branch_id: BranchId,
    ) -> Result<Vec<Forecast>, RepositoryError>;
}

/// Read access to externally maintained stock levels.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    async fn get(
        &self,
        product_id: ProductId,
        branch_id: BranchId,
    ) -> Result<Option<InventoryRecord>, RepositoryError>;

    /// All stock rows of a branch, ordered by product id.
    async fn list_branch(&self, branch_id: BranchId)
    -> Result<Vec<InventoryRecord>, RepositoryError>;

    /// Every stock row, ordered by branch id then product id.
    async fn list_all(&self) -> Result<Vec<InventoryRecord>, RepositoryError>;
}

/// Append-only recommendation log (no deduplication).
#[async_trait]
pub trait RecommendationRepository: Send + Sync {
    async fn append(
        &self,
        recommendation: NewRecommendation,
    ) -> Result<ReorderRecommendation, RepositoryError>;

    /// All recommendations for a key, most recent first.
    async fn history(
        &self,
        product_id: ProductId,
        branch_id: BranchId,
    ) -> Result<Vec<ReorderRecommendation>, RepositoryError>;
}

#[async_trait]
pub trait AlertRepository: Send + Sync {
    async fn insert(&self, alert: Alert) -> Result<Alert, RepositoryError>;

    /// Alerts visible in `scope`, most recent first.
    async fn list(&self, scope: AlertScope) -> Result<Vec<Alert>, RepositoryError>;

    /// Set `is_read`; returns the updated alert, or `None` if it does not exist.
    async fn mark_read(&self, alert_id: AlertId) -> Result<Option<Alert>, RepositoryError>;
}

#[async_trait]
impl<S> ForecastRepository for Arc<S>
where
    S: ForecastRepository + ?Sized,
{
    async fn record(&self, forecast: NewForecast) -> Result<Forecast, RepositoryError> {
        (**self).record(forecast).await
    }

    async fn latest(
        &self,
        product_id: ProductId,
        branch_id: BranchId,
    ) -> Result<Option<Forecast>, RepositoryError> {
        (**self).latest(product_id, branch_id).await
    }

    async fn history(
        &self,
        product_id: ProductId,
        branch_id: BranchId,
    ) -> Result<Vec<Forecast>, RepositoryError> {
        (**self).history(product_id, branch_id).await
    }
}

#[async_trait]
impl<S> InventoryRepository for Arc<S>
where
    S: InventoryRepository + ?Sized,
{
    async fn get(
        &self,
        product_id: ProductId,
        branch_id: BranchId,
    ) -> Result<Option<InventoryRecord>, RepositoryError> {
        (**self).get(product_id, branch_id).await
    }

    async fn list_branch(
        &self,
        branch_id: BranchId,
    ) -> Result<Vec<InventoryRecord>, RepositoryError> {
        (**self).list_branch(branch_id).await
    }

    async fn list_all(&self) -> Result<Vec<InventoryRecord>, RepositoryError> {
        (**self).list_all().await
    }
}

#[async_trait]
impl<S> RecommendationRepository for Arc<S>
where
    S: RecommendationRepository + ?Sized,
{
    async fn append(
        &self,
        recommendation: NewRecommendation,
    ) -> Result<ReorderRecommendation, RepositoryError> {
        (**self).append(recommendation).await
    }

    async fn history(
        &self,
        product_id: ProductId,
        branch_id: BranchId,
    ) -> Result<Vec<ReorderRecommendation>, RepositoryError> {
        (**self).history(product_id, branch_id).await
    }
}

#[async_trait]
impl<S> AlertRepository for Arc<S>
where
    S: AlertRepository + ?Sized,
{
    async fn insert(&self, alert: Alert) -> Result<Alert, RepositoryError> {
        (**self).insert(alert).await
    }

    async fn list(&self, scope: AlertScope) -> Result<Vec<Alert>, RepositoryError> {
        (**self).list(scope).await
    }

    async fn mark_read(&self, alert_id: AlertId) -> Result<Option<Alert>, RepositoryError> {
        (**self).mark_read(alert_id).await
    }
}
