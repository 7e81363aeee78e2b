use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/forecasts", get(forecast_history))
        .route("/forecasts/predict", post(predict_demand))
}

pub async fn predict_demand(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::PredictDemandRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return dto::json_rejection(rejection),
    };

    let forecast = match services.predict(body.into()).await {
        Ok(f) => f,
        Err(e) => return errors::pipeline_error_to_response(e),
    };

    (StatusCode::CREATED, Json(dto::forecast_to_json(&forecast))).into_response()
}

pub async fn forecast_history(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::KeyRequest>, QueryRejection>,
) -> axum::response::Response {
    let Query(key) = match query {
        Ok(q) => q,
        Err(rejection) => return dto::query_rejection(rejection),
    };

    match services.forecast_history(&key.product, &key.branch).await {
        Ok(rows) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "count": rows.len(),
                "forecasts": rows.iter().map(dto::forecast_to_json).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::pipeline_error_to_response(e),
    }
}
