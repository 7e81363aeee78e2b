//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: repositories, model and identifier directory wiring
//! - `routes/`: HTTP routes + handlers (one file per pipeline area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use novastock_infra::AppConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::{AppServices, StartupError};

/// Build the full HTTP router from configuration (entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> Result<Router, StartupError> {
    let services = services::build_services(config).await?;
    Ok(router_with(Arc::new(services)))
}

/// Router over already-wired services.
pub fn router_with(services: Arc<AppServices>) -> Router {
    routes::router().layer(ServiceBuilder::new().layer(Extension(services)))
}
