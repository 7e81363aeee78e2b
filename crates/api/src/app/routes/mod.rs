use axum::{routing::get, Router};

pub mod alerts;
pub mod forecasts;
pub mod inventory;
pub mod reorders;
pub mod system;

/// Router for all endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .merge(forecasts::router())
        .merge(reorders::router())
        .merge(alerts::router())
        .merge(inventory::router())
}
