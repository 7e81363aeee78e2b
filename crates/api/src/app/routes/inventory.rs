use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use novastock_core::BranchId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/inventory/low-stock", get(low_stock_all))
        .route("/inventory/:branch_id", get(branch_inventory))
        .route("/inventory/:branch_id/low-stock", get(low_stock))
}

fn parse_branch(raw: &str) -> Result<BranchId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::validation_error("invalid branch id"))
}

pub async fn branch_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Path(branch_id): Path<String>,
) -> axum::response::Response {
    let branch_id = match parse_branch(&branch_id) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services.branch_inventory(branch_id).await {
        Ok(rows) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "branch_id": branch_id.get(),
                "count": rows.len(),
                "items": rows
                    .iter()
                    .map(|r| dto::inventory_to_json(r, services.directory()))
                    .collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::pipeline_error_to_response(e),
    }
}

pub async fn low_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(branch_id): Path<String>,
) -> axum::response::Response {
    let branch_id = match parse_branch(&branch_id) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    match services.low_stock(branch_id).await {
        Ok(rows) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "branch_id": branch_id.get(),
                "count": rows.len(),
                "items": rows
                    .iter()
                    .map(|r| dto::inventory_to_json(r, services.directory()))
                    .collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::pipeline_error_to_response(e),
    }
}

/// Low-stock rows across every branch.
pub async fn low_stock_all(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.low_stock_all().await {
        Ok(rows) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "count": rows.len(),
                "items": rows
                    .iter()
                    .map(|r| dto::inventory_to_json(r, services.directory()))
                    .collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::pipeline_error_to_response(e),
    }
}
