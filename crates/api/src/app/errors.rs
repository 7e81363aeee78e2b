use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use novastock_infra::PipelineError;

pub fn pipeline_error_to_response(err: PipelineError) -> axum::response::Response {
    match err {
        PipelineError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        e @ PipelineError::UnknownIdentifier { .. } => {
            json_error(StatusCode::BAD_REQUEST, "unknown_identifier", e.to_string())
        }
        e @ PipelineError::UnknownCategory { .. } => {
            json_error(StatusCode::BAD_REQUEST, "unknown_category", e.to_string())
        }
        PipelineError::Access(e) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_access_request", e.to_string())
        }
        e @ PipelineError::NoForecast { .. } => {
            json_error(StatusCode::NOT_FOUND, "no_forecast", e.to_string())
        }
        e @ PipelineError::NoInventory { .. } => {
            json_error(StatusCode::NOT_FOUND, "no_inventory", e.to_string())
        }
        e @ PipelineError::AlertNotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "not_found", e.to_string())
        }
        PipelineError::Prediction(msg) => {
            tracing::error!(error = %msg, "demand model failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "prediction_error",
                "demand prediction failed",
            )
        }
        PipelineError::Persistence(e) => {
            // Store details stay in the logs.
            tracing::error!(error = %e, "persistence failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "persistence_error",
                "the request could not be persisted",
            )
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn validation_error(message: impl Into<String>) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", message)
}
