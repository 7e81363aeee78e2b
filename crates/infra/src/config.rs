//! Process configuration, read once at startup from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `BIND_ADDR` | `0.0.0.0:8080` |
//! | `MODEL_PATH` | `artifacts/demand_model.json` |
//! | `IDENTIFIERS_PATH` | unset (built-in identifier maps) |
//! | `INVENTORY_SEED_PATH` | unset (empty in-memory inventory) |
//! | `USE_PERSISTENT_STORES` | `false` |
//! | `DATABASE_URL` | required when `USE_PERSISTENT_STORES=true` |
//! | `DATABASE_MAX_CONNECTIONS` | `10` |

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MODEL_PATH: &str = "artifacts/demand_model.json";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

impl ConfigError {
    pub fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Where repositories keep their rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    InMemory {
        inventory_seed_path: Option<PathBuf>,
    },
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub model_path: PathBuf,
    pub identifiers_path: Option<PathBuf>,
    pub stores: StoreConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("BIND_ADDR", e.to_string()))?;

        let model_path = get("MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));

        let identifiers_path = get("IDENTIFIERS_PATH").map(PathBuf::from);

        let persistent = match get("USE_PERSISTENT_STORES") {
            None => false,
            Some(v) => parse_bool(&v).ok_or_else(|| {
                ConfigError::invalid("USE_PERSISTENT_STORES", format!("'{v}' is not a boolean"))
            })?,
        };

        let stores = if persistent {
            let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
            let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
                None => DEFAULT_MAX_CONNECTIONS,
                Some(v) => v
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| {
                        ConfigError::invalid(
                            "DATABASE_MAX_CONNECTIONS",
                            format!("'{v}' is not a positive integer"),
                        )
                    })?,
            };
            StoreConfig::Postgres {
                database_url,
                max_connections,
            }
        } else {
            StoreConfig::InMemory {
                inventory_seed_path: get("INVENTORY_SEED_PATH").map(PathBuf::from),
            }
        };

        Ok(Self {
            bind_addr,
            model_path,
            identifiers_path,
            stores,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
