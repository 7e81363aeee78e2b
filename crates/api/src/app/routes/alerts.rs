use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use novastock_core::AlertId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/alerts", get(list_alerts))
        .route("/alerts/evaluate", post(evaluate_alert))
        .route("/alerts/:id/read", put(mark_read))
}

pub async fn evaluate_alert(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::EvaluateAlertRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return dto::json_rejection(rejection),
    };

    match services.evaluate_alert(body.into()).await {
        Ok(Some(alert)) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "alert_created": true,
                "alert": dto::alert_to_json(&alert),
            })),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::OK,
            Json(serde_json::json!({ "alert_created": false })),
        )
            .into_response(),
        Err(e) => errors::pipeline_error_to_response(e),
    }
}

pub async fn list_alerts(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ListAlertsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return dto::query_rejection(rejection),
    };

    let branch_id = match dto::parse_optional_branch(query.branch_id.as_deref()) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let role = query.role.unwrap_or_default();

    match services.list_alerts(role.trim(), branch_id).await {
        Ok(alerts) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "count": alerts.len(),
                "alerts": alerts.iter().map(dto::alert_to_json).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::pipeline_error_to_response(e),
    }
}

pub async fn mark_read(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let alert_id: AlertId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::validation_error("invalid alert id"),
    };

    match services.mark_alert_read(alert_id).await {
        Ok(alert) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "acknowledged": true,
                "alert": dto::alert_to_json(&alert),
            })),
        )
            .into_response(),
        Err(e) => errors::pipeline_error_to_response(e),
    }
}
