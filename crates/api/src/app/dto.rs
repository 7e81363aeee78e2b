use axum::extract::rejection::{JsonRejection, QueryRejection};
use chrono::NaiveDate;
use serde::Deserialize;

use novastock_core::{BranchId, ProductId};
use novastock_infra::{IdentifierDirectory, PredictRequest};
use novastock_restock::{Alert, AlertCheck, Forecast, InventoryRecord, ReorderRecommendation};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct PredictDemandRequest {
    pub price: f64,
    pub promotion: u8,
    pub branch: String,
    #[serde(alias = "product_id")]
    pub product: String,
    pub seasonality: String,
    #[serde(default, alias = "forecast_date")]
    pub date: Option<NaiveDate>,
}

impl From<PredictDemandRequest> for PredictRequest {
    fn from(body: PredictDemandRequest) -> Self {
        PredictRequest {
            price: body.price,
            promotion: body.promotion,
            branch: body.branch,
            product: body.product,
            seasonality: body.seasonality,
            forecast_date: body.date,
        }
    }
}

/// `(product, branch)` key in external codes.
#[derive(Debug, Deserialize)]
pub struct KeyRequest {
    #[serde(alias = "product_id")]
    pub product: String,
    pub branch: String,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateAlertRequest {
    pub branch_id: i64,
    pub product_id: i64,
    pub quantity_on_hand: u32,
    pub safety_stock: u32,
    #[serde(alias = "reorder_quantity")]
    pub recommended_reorder_quantity: u64,
}

impl From<EvaluateAlertRequest> for AlertCheck {
    fn from(body: EvaluateAlertRequest) -> Self {
        AlertCheck {
            branch_id: BranchId::new(body.branch_id),
            product_id: ProductId::new(body.product_id),
            quantity_on_hand: body.quantity_on_hand,
            safety_stock: body.safety_stock,
            reorder_quantity: body.recommended_reorder_quantity,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListAlertsQuery {
    pub role: Option<String>,
    pub branch_id: Option<String>,
}

// -------------------------
// Extractor rejections
// -------------------------

pub fn json_rejection(rejection: JsonRejection) -> axum::response::Response {
    errors::validation_error(rejection.body_text())
}

pub fn query_rejection(rejection: QueryRejection) -> axum::response::Response {
    errors::validation_error(rejection.body_text())
}

/// Parse an optional id parameter; blank counts as absent.
pub fn parse_optional_branch(
    raw: Option<&str>,
) -> Result<Option<BranchId>, axum::response::Response> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<BranchId>()
            .map(Some)
            .map_err(|e| errors::validation_error(e.to_string())),
    }
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn forecast_to_json(f: &Forecast) -> serde_json::Value {
    serde_json::json!({
        "forecast_id": f.forecast_id.get(),
        "product_id": f.product_id.get(),
        "branch_id": f.branch_id.get(),
        "forecast_date": f.forecast_date.to_string(),
        "predicted_demand": f.predicted_demand,
        "model_version": f.model_version,
    })
}

pub fn recommendation_to_json(r: &ReorderRecommendation) -> serde_json::Value {
    serde_json::json!({
        "recommendation_id": r.recommendation_id.get(),
        "product_id": r.product_id.get(),
        "branch_id": r.branch_id.get(),
        "predicted_demand": r.predicted_demand,
        "quantity_on_hand": r.quantity_on_hand,
        "safety_stock": r.safety_stock,
        "recommended_reorder_quantity": r.recommended_reorder_quantity,
        "created_at": r.created_at.to_rfc3339(),
    })
}

pub fn alert_to_json(a: &Alert) -> serde_json::Value {
    serde_json::json!({
        "alert_id": a.alert_id().to_string(),
        "branch_id": a.branch_id().get(),
        "product_id": a.product_id().get(),
        "type": a.kind().as_str(),
        "message": a.message(),
        "is_read": a.is_read(),
        "created_at": a.created_at().to_rfc3339(),
    })
}

/// Stock row, with external codes when the directory knows them.
pub fn inventory_to_json(
    r: &InventoryRecord,
    directory: &IdentifierDirectory,
) -> serde_json::Value {
    serde_json::json!({
        "product_id": r.product_id.get(),
        "product": directory.product_code(r.product_id),
        "branch_id": r.branch_id.get(),
        "branch": directory.branch_name(r.branch_id),
        "quantity_on_hand": r.quantity_on_hand,
        "safety_stock": r.safety_stock,
    })
}
