//! Infrastructure layer: repositories, configuration, identifier directory and
//! the restock pipeline that composes them.

pub mod config;
pub mod identifiers;
pub mod pipeline;
pub mod repositories;
pub mod seed;

pub use config::{AppConfig, ConfigError, StoreConfig};
pub use identifiers::{IdentifierConfig, IdentifierDirectory};
pub use pipeline::{PipelineError, PredictRequest, RestockService};
pub use seed::load_inventory_seed;
