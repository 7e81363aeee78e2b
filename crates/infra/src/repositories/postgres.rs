//! Postgres-backed repositories.
//!
//! Table layout (schema migrations are managed outside this service):
//!
//! - `forecasts`: `forecast_id BIGSERIAL PK`, `product_id BIGINT`, `branch_id BIGINT`,
//!   `forecast_date DATE`, `predicted_demand BIGINT`, `model_version TEXT`.
//! - `inventory`: `product_id BIGINT`, `branch_id BIGINT`, `quantity_on_hand BIGINT`,
//!   `safety_stock BIGINT`, PK `(product_id, branch_id)`.
//! - `reorder_recommendations`: `recommendation_id BIGSERIAL PK`, `branch_id`, `product_id`,
//!   `predicted_demand`, `quantity_on_hand`, `safety_stock`,
//!   `recommended_reorder_quantity BIGINT`, `created_at TIMESTAMPTZ`.
//! - `alerts`: `alert_id UUID PK`, `branch_id BIGINT`, `product_id BIGINT`, `type TEXT`,
//!   `message TEXT`, `is_read BOOLEAN DEFAULT FALSE`, `created_at TIMESTAMPTZ`.
//!
//! ## Atomicity
//!
//! Every operation is a single statement; no transaction spans more than one
//! write. Alert acknowledgment is a single `UPDATE ... RETURNING`, so it is
//! idempotent and never reverts `is_read`.
//!
//! ## Error Mapping
//!
//! SQLx failures map to `RepositoryError::Storage` (with the operation name);
//! rows whose values do not fit the domain types map to
//! `RepositoryError::CorruptRow`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use novastock_auth::AlertScope;
use novastock_core::{AlertId, BranchId, ForecastId, ProductId, RecommendationId};
use novastock_restock::{
    Alert, AlertKind, Forecast, InventoryRecord, NewForecast, NewRecommendation,
    ReorderRecommendation,
};

use super::{
    AlertRepository, ForecastRepository, InventoryRepository, RecommendationRepository,
    RepositoryError,
};

/// Postgres implementation of all four repository contracts.
///
/// Uses SQLx connection pool which is thread-safe (Arc + Send + Sync).
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: Arc<PgPool>,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    RepositoryError::Storage(format!("{operation}: {err}"))
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get::<T, _>(name)
        .map_err(|e| RepositoryError::CorruptRow(format!("column '{name}': {e}")))
}

fn u32_column(row: &PgRow, name: &str) -> Result<u32, RepositoryError> {
    let raw: i64 = column(row, name)?;
    u32::try_from(raw)
        .map_err(|_| RepositoryError::CorruptRow(format!("column '{name}' out of range: {raw}")))
}

fn u64_column(row: &PgRow, name: &str) -> Result<u64, RepositoryError> {
    let raw: i64 = column(row, name)?;
    u64::try_from(raw)
        .map_err(|_| RepositoryError::CorruptRow(format!("column '{name}' out of range: {raw}")))
}

fn to_i64(value: u64, name: &str) -> Result<i64, RepositoryError> {
    i64::try_from(value)
        .map_err(|_| RepositoryError::Storage(format!("{name} does not fit BIGINT: {value}")))
}

fn forecast_from_row(row: &PgRow) -> Result<Forecast, RepositoryError> {
    Ok(Forecast {
        forecast_id: ForecastId::new(column(row, "forecast_id")?),
        product_id: ProductId::new(column(row, "product_id")?),
        branch_id: BranchId::new(column(row, "branch_id")?),
        forecast_date: column::<NaiveDate>(row, "forecast_date")?,
        predicted_demand: u32_column(row, "predicted_demand")?,
        model_version: column(row, "model_version")?,
    })
}

fn inventory_from_row(row: &PgRow) -> Result<InventoryRecord, RepositoryError> {
    Ok(InventoryRecord {
        product_id: ProductId::new(column(row, "product_id")?),
        branch_id: BranchId::new(column(row, "branch_id")?),
        quantity_on_hand: u32_column(row, "quantity_on_hand")?,
        safety_stock: u32_column(row, "safety_stock")?,
    })
}

fn recommendation_from_row(row: &PgRow) -> Result<ReorderRecommendation, RepositoryError> {
    Ok(ReorderRecommendation {
        recommendation_id: RecommendationId::new(column(row, "recommendation_id")?),
        branch_id: BranchId::new(column(row, "branch_id")?),
        product_id: ProductId::new(column(row, "product_id")?),
        predicted_demand: u32_column(row, "predicted_demand")?,
        quantity_on_hand: u32_column(row, "quantity_on_hand")?,
        safety_stock: u32_column(row, "safety_stock")?,
        recommended_reorder_quantity: u64_column(row, "recommended_reorder_quantity")?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
    })
}

fn alert_from_row(row: &PgRow) -> Result<Alert, RepositoryError> {
    let kind: String = column(row, "type")?;
    let kind = AlertKind::parse(&kind)
        .ok_or_else(|| RepositoryError::CorruptRow(format!("unknown alert type '{kind}'")))?;

    Ok(Alert::from_parts(
        AlertId::from_uuid(column(row, "alert_id")?),
        BranchId::new(column(row, "branch_id")?),
        ProductId::new(column(row, "product_id")?),
        kind,
        column(row, "message")?,
        column(row, "is_read")?,
        column::<DateTime<Utc>>(row, "created_at")?,
    ))
}

const FORECAST_COLUMNS: &str =
    "forecast_id, product_id, branch_id, forecast_date, predicted_demand, model_version";

const RECOMMENDATION_COLUMNS: &str = "recommendation_id, branch_id, product_id, predicted_demand, \
     quantity_on_hand, safety_stock, recommended_reorder_quantity, created_at";

const ALERT_COLUMNS: &str = "alert_id, branch_id, product_id, type, message, is_read, created_at";

#[async_trait]
impl ForecastRepository for PostgresRepository {
    #[instrument(
        skip(self, forecast),
        fields(product_id = %forecast.product_id, branch_id = %forecast.branch_id),
        err
    )]
    async fn record(&self, forecast: NewForecast) -> Result<Forecast, RepositoryError> {
        let sql = format!(
            "INSERT INTO forecasts \
             (product_id, branch_id, forecast_date, predicted_demand, model_version) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {FORECAST_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(forecast.product_id.get())
            .bind(forecast.branch_id.get())
            .bind(forecast.forecast_date)
            .bind(i64::from(forecast.predicted_demand))
            .bind(&forecast.model_version)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("record_forecast", e))?;

        forecast_from_row(&row)
    }

    #[instrument(skip(self), err)]
    async fn latest(
        &self,
        product_id: ProductId,
        branch_id: BranchId,
    ) -> Result<Option<Forecast>, RepositoryError> {
        let sql = format!(
            "SELECT {FORECAST_COLUMNS} FROM forecasts \
             WHERE product_id = $1 AND branch_id = $2 \
             ORDER BY forecast_date DESC, forecast_id DESC LIMIT 1"
        );
        let row = sqlx::query(&sql)
            .bind(product_id.get())
            .bind(branch_id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("latest_forecast", e))?;

        row.as_ref().map(forecast_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn history(
        &self,
        product_id: ProductId,
        branch_id: BranchId,
    ) -> Result<Vec<Forecast>, RepositoryError> {
        let sql = format!(
            "SELECT {FORECAST_COLUMNS} FROM forecasts \
             WHERE product_id = $1 AND branch_id = $2 \
             ORDER BY forecast_date DESC, forecast_id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(product_id.get())
            .bind(branch_id.get())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("forecast_history", e))?;

        rows.iter().map(forecast_from_row).collect()
    }
}

#[async_trait]
impl InventoryRepository for PostgresRepository {
    #[instrument(skip(self), err)]
    async fn get(
        &self,
        product_id: ProductId,
        branch_id: BranchId,
    ) -> Result<Option<InventoryRecord>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT product_id, branch_id, quantity_on_hand, safety_stock
            FROM inventory
            WHERE product_id = $1 AND branch_id = $2
            "#,
        )
        .bind(product_id.get())
        .bind(branch_id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_inventory", e))?;

        row.as_ref().map(inventory_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_branch(
        &self,
        branch_id: BranchId,
    ) -> Result<Vec<InventoryRecord>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT product_id, branch_id, quantity_on_hand, safety_stock
            FROM inventory
            WHERE branch_id = $1
            ORDER BY product_id ASC
            "#,
        )
        .bind(branch_id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_branch_inventory", e))?;

        rows.iter().map(inventory_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn list_all(&self) -> Result<Vec<InventoryRecord>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT product_id, branch_id, quantity_on_hand, safety_stock
            FROM inventory
            ORDER BY branch_id ASC, product_id ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_all_inventory", e))?;

        rows.iter().map(inventory_from_row).collect()
    }
}

#[async_trait]
impl RecommendationRepository for PostgresRepository {
    #[instrument(
        skip(self, recommendation),
        fields(
            product_id = %recommendation.product_id,
            branch_id = %recommendation.branch_id
        ),
        err
    )]
    async fn append(
        &self,
        recommendation: NewRecommendation,
    ) -> Result<ReorderRecommendation, RepositoryError> {
        let sql = format!(
            "INSERT INTO reorder_recommendations \
             (branch_id, product_id, predicted_demand, quantity_on_hand, safety_stock, \
             recommended_reorder_quantity, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {RECOMMENDATION_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(recommendation.branch_id.get())
            .bind(recommendation.product_id.get())
            .bind(i64::from(recommendation.predicted_demand))
            .bind(i64::from(recommendation.quantity_on_hand))
            .bind(i64::from(recommendation.safety_stock))
            .bind(to_i64(
                recommendation.recommended_reorder_quantity,
                "recommended_reorder_quantity",
            )?)
            .bind(recommendation.created_at)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("append_recommendation", e))?;

        recommendation_from_row(&row)
    }

    #[instrument(skip(self), err)]
    async fn history(
        &self,
        product_id: ProductId,
        branch_id: BranchId,
    ) -> Result<Vec<ReorderRecommendation>, RepositoryError> {
        let sql = format!(
            "SELECT {RECOMMENDATION_COLUMNS} FROM reorder_recommendations \
             WHERE product_id = $1 AND branch_id = $2 \
             ORDER BY recommendation_id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(product_id.get())
            .bind(branch_id.get())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("recommendation_history", e))?;

        rows.iter().map(recommendation_from_row).collect()
    }
}

#[async_trait]
impl AlertRepository for PostgresRepository {
    #[instrument(skip(self, alert), fields(alert_id = %alert.alert_id()), err)]
    async fn insert(&self, alert: Alert) -> Result<Alert, RepositoryError> {
        let sql = format!(
            "INSERT INTO alerts ({ALERT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {ALERT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(*alert.alert_id().as_uuid())
            .bind(alert.branch_id().get())
            .bind(alert.product_id().get())
            .bind(alert.kind().as_str())
            .bind(alert.message())
            .bind(alert.is_read())
            .bind(alert.created_at())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_alert", e))?;

        alert_from_row(&row)
    }

    #[instrument(skip(self), err)]
    async fn list(&self, scope: AlertScope) -> Result<Vec<Alert>, RepositoryError> {
        let branch_filter: Option<i64> = match scope {
            AlertScope::All => None,
            AlertScope::Branch(b) => Some(b.get()),
        };
        let sql = format!(
            "SELECT {ALERT_COLUMNS} FROM alerts \
             WHERE ($1::bigint IS NULL OR branch_id = $1) \
             ORDER BY created_at DESC, alert_id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(branch_filter)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_alerts", e))?;

        rows.iter().map(alert_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn mark_read(&self, alert_id: AlertId) -> Result<Option<Alert>, RepositoryError> {
        let sql = format!(
            "UPDATE alerts SET is_read = TRUE WHERE alert_id = $1 RETURNING {ALERT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(*alert_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("mark_alert_read", e))?;

        row.as_ref().map(alert_from_row).transpose()
    }
}
