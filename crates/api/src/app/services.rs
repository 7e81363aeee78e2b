//! Service wiring: model artifact, identifier directory and repositories.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use novastock_forecasting::{DemandPredictor, ModelArtifact, PredictError};
use novastock_infra::repositories::{
    AlertRepository, ForecastRepository, InMemoryAlertRepository, InMemoryForecastRepository,
    InMemoryInventoryRepository, InMemoryRecommendationRepository, InventoryRepository,
    PostgresRepository, RecommendationRepository, RepositoryError,
};
use novastock_infra::{
    AppConfig, ConfigError, IdentifierDirectory, RestockService, StoreConfig, load_inventory_seed,
};
use novastock_restock::InventoryRecord;

/// The pipeline as served over HTTP: repositories are type-erased so the
/// same router runs on either backend.
pub type AppServices = RestockService<
    Arc<dyn ForecastRepository>,
    Arc<dyn InventoryRepository>,
    Arc<dyn RecommendationRepository>,
    Arc<dyn AlertRepository>,
>;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to load demand model: {0}")]
    Model(#[from] PredictError),

    #[error("failed to connect to postgres: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to seed in-memory stores: {0}")]
    Seed(#[from] RepositoryError),
}

pub async fn build_services(config: &AppConfig) -> Result<AppServices, StartupError> {
    let predictor = DemandPredictor::new(ModelArtifact::from_path(&config.model_path)?);

    let directory = match &config.identifiers_path {
        Some(path) => IdentifierDirectory::from_path(path)?,
        None => {
            tracing::info!("IDENTIFIERS_PATH not set; using built-in identifier maps");
            IdentifierDirectory::builtin()
        }
    };
    let directory = Arc::new(directory);

    match &config.stores {
        StoreConfig::InMemory {
            inventory_seed_path,
        } => {
            let records = match inventory_seed_path {
                Some(path) => load_inventory_seed(path, &directory)?,
                None => {
                    tracing::warn!("INVENTORY_SEED_PATH not set; in-memory inventory starts empty");
                    Vec::new()
                }
            };
            in_memory_services(predictor, directory, records)
        }
        StoreConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .connect(database_url)
                .await?;
            tracing::info!(max_connections = *max_connections, "connected to postgres");

            let repo = Arc::new(PostgresRepository::new(pool));
            let forecasts: Arc<dyn ForecastRepository> = repo.clone();
            let inventory: Arc<dyn InventoryRepository> = repo.clone();
            let recommendations: Arc<dyn RecommendationRepository> = repo.clone();
            let alerts: Arc<dyn AlertRepository> = repo;

            Ok(RestockService::new(
                predictor,
                directory,
                forecasts,
                inventory,
                recommendations,
                alerts,
            ))
        }
    }
}

/// In-memory wiring (dev mode and black-box tests).
pub fn in_memory_services(
    predictor: DemandPredictor,
    directory: Arc<IdentifierDirectory>,
    inventory: Vec<InventoryRecord>,
) -> Result<AppServices, StartupError> {
    let forecasts: Arc<dyn ForecastRepository> = Arc::new(InMemoryForecastRepository::new());
    let inventory: Arc<dyn InventoryRepository> =
        Arc::new(InMemoryInventoryRepository::with_records(inventory)?);
    let recommendations: Arc<dyn RecommendationRepository> =
        Arc::new(InMemoryRecommendationRepository::new());
    let alerts: Arc<dyn AlertRepository> = Arc::new(InMemoryAlertRepository::new());

    Ok(RestockService::new(
        predictor,
        directory,
        forecasts,
        inventory,
        recommendations,
        alerts,
    ))
}
