use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/reorders", get(recommendation_history).post(compute_reorder))
}

pub async fn compute_reorder(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::KeyRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(key) = match body {
        Ok(b) => b,
        Err(rejection) => return dto::json_rejection(rejection),
    };

    match services.compute_reorder(&key.product, &key.branch).await {
        Ok(rec) => (StatusCode::CREATED, Json(dto::recommendation_to_json(&rec))).into_response(),
        Err(e) => errors::pipeline_error_to_response(e),
    }
}

pub async fn recommendation_history(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::KeyRequest>, QueryRejection>,
) -> axum::response::Response {
    let Query(key) = match query {
        Ok(q) => q,
        Err(rejection) => return dto::query_rejection(rejection),
    };

    match services.recommendation_history(&key.product, &key.branch).await {
        Ok(rows) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "count": rows.len(),
                "recommendations": rows.iter().map(dto::recommendation_to_json).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::pipeline_error_to_response(e),
    }
}
