//! In-memory repositories for tests/dev. Not optimized for performance.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use novastock_auth::AlertScope;
use novastock_core::{AlertId, BranchId, ForecastId, ProductId, RecommendationId};
use novastock_restock::{
    Alert, Forecast, InventoryRecord, NewForecast, NewRecommendation, ReorderRecommendation,
};

use super::{
    AlertRepository, ForecastRepository, InventoryRepository, RecommendationRepository,
    RepositoryError,
};

fn poisoned() -> RepositoryError {
    RepositoryError::Storage("lock poisoned".to_string())
}

/// Append-only forecast ledger backed by a vector.
#[derive(Debug, Default)]
pub struct InMemoryForecastRepository {
    rows: RwLock<Vec<Forecast>>,
}

impl InMemoryForecastRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ForecastRepository for InMemoryForecastRepository {
    async fn record(&self, forecast: NewForecast) -> Result<Forecast, RepositoryError> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        // Sequence numbers start at 1 and follow append order.
        let stored = forecast.into_stored(ForecastId::new(rows.len() as i64 + 1));
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn latest(
        &self,
        product_id: ProductId,
        branch_id: BranchId,
    ) -> Result<Option<Forecast>, RepositoryError> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows
            .iter()
            .filter(|f| f.product_id == product_id && f.branch_id == branch_id)
            .max_by_key(|f| f.recency_key())
            .cloned())
    }

    async fn history(
        &self,
        product_id: ProductId,
        branch_id: BranchId,
    ) -> Result<Vec<Forecast>, RepositoryError> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        let mut out: Vec<Forecast> = rows
            .iter()
            .filter(|f| f.product_id == product_id && f.branch_id == branch_id)
            .cloned()
            .collect();
        out.sort_by_key(|f| std::cmp::Reverse(f.recency_key()));
        Ok(out)
    }
}

/// Stock levels keyed by (branch, product).
///
/// The pipeline only reads through [`InventoryRepository`]; `upsert` exists
/// for seeding and tests, standing in for the external system that owns stock.
#[derive(Debug, Default)]
pub struct InMemoryInventoryRepository {
    rows: RwLock<BTreeMap<(BranchId, ProductId), InventoryRecord>>,
}

impl InMemoryInventoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(
        records: impl IntoIterator<Item = InventoryRecord>,
    ) -> Result<Self, RepositoryError> {
        let repo = Self::new();
        for r in records {
            repo.upsert(r)?;
        }
        Ok(repo)
    }

    /// Insert or replace the row for `(product, branch)`.
    pub fn upsert(&self, record: InventoryRecord) -> Result<(), RepositoryError> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        rows.insert((record.branch_id, record.product_id), record);
        Ok(())
    }
}

#[async_trait]
impl InventoryRepository for InMemoryInventoryRepository {
    async fn get(
        &self,
        product_id: ProductId,
        branch_id: BranchId,
    ) -> Result<Option<InventoryRecord>, RepositoryError> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows.get(&(branch_id, product_id)).copied())
    }

    async fn list_branch(
        &self,
        branch_id: BranchId,
    ) -> Result<Vec<InventoryRecord>, RepositoryError> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows
            .range((branch_id, ProductId::new(i64::MIN))..=(branch_id, ProductId::new(i64::MAX)))
            .map(|(_, r)| *r)
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<InventoryRecord>, RepositoryError> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows.values().copied().collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRecommendationRepository {
    rows: RwLock<Vec<ReorderRecommendation>>,
}

impl InMemoryRecommendationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecommendationRepository for InMemoryRecommendationRepository {
    async fn append(
        &self,
        recommendation: NewRecommendation,
    ) -> Result<ReorderRecommendation, RepositoryError> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        let stored = recommendation.into_stored(RecommendationId::new(rows.len() as i64 + 1));
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn history(
        &self,
        product_id: ProductId,
        branch_id: BranchId,
    ) -> Result<Vec<ReorderRecommendation>, RepositoryError> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        // Append order is sequence order; newest first.
        Ok(rows
            .iter()
            .rev()
            .filter(|r| r.product_id == product_id && r.branch_id == branch_id)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAlertRepository {
    alerts: RwLock<HashMap<AlertId, Alert>>,
}

impl InMemoryAlertRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AlertRepository for InMemoryAlertRepository {
    async fn insert(&self, alert: Alert) -> Result<Alert, RepositoryError> {
        let mut alerts = self.alerts.write().map_err(|_| poisoned())?;
        if alerts.contains_key(&alert.alert_id()) {
            return Err(RepositoryError::Storage(format!(
                "duplicate alert id {}",
                alert.alert_id()
            )));
        }
        alerts.insert(alert.alert_id(), alert.clone());
        Ok(alert)
    }

    async fn list(&self, scope: AlertScope) -> Result<Vec<Alert>, RepositoryError> {
        let alerts = self.alerts.read().map_err(|_| poisoned())?;
        let mut out: Vec<Alert> = alerts
            .values()
            .filter(|a| scope.allows(a.branch_id()))
            .cloned()
            .collect();
        out.sort_by_key(|a| std::cmp::Reverse(a.recency_key()));
        Ok(out)
    }

    async fn mark_read(&self, alert_id: AlertId) -> Result<Option<Alert>, RepositoryError> {
        let mut alerts = self.alerts.write().map_err(|_| poisoned())?;
        Ok(alerts.get_mut(&alert_id).map(|a| {
            a.mark_read();
            a.clone()
        }))
    }
}
