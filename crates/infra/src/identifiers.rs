//! External business codes to internal numeric identifiers.
//!
//! The directory is loaded once at startup (JSON file or built-in defaults) and
//! shared read-only. Lookups are exact after trimming surrounding whitespace;
//! codes are case-sensitive. Unknown codes fail closed.
//!
//! File format:
//!
//! ```json
//! {
//!   "products": { "P0001": 1, "P0002": 2 },
//!   "branches": { "Colombo": 1, "Kandy": 2 }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use novastock_core::{BranchId, DomainError, ProductId};

use crate::config::ConfigError;

/// Raw identifier maps as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentifierConfig {
    pub products: BTreeMap<String, i64>,
    pub branches: BTreeMap<String, i64>,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        let products = [("P0001", 1), ("P0002", 2), ("P0003", 3)];
        let branches = [("Colombo", 1), ("Kandy", 2), ("Galle", 3)];
        Self {
            products: products.into_iter().map(|(c, id)| (c.to_string(), id)).collect(),
            branches: branches.into_iter().map(|(c, id)| (c.to_string(), id)).collect(),
        }
    }
}

#[derive(Debug, Clone)]
struct CodeMap<Id> {
    by_code: HashMap<String, Id>,
    // Several codes may share an id; the lexicographically smallest one is
    // used when rendering.
    by_id: BTreeMap<Id, String>,
}

impl<Id: Copy + Ord> CodeMap<Id> {
    fn build(
        key: &'static str,
        raw: &BTreeMap<String, i64>,
        make: impl Fn(i64) -> Id,
    ) -> Result<Self, ConfigError> {
        let mut by_code = HashMap::with_capacity(raw.len());
        let mut by_id = BTreeMap::new();

        for (code, &id) in raw {
            let trimmed = code.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::invalid(key, "codes cannot be empty"));
            }
            if id <= 0 {
                return Err(ConfigError::invalid(
                    key,
                    format!("id for '{trimmed}' must be positive (got {id})"),
                ));
            }
            let id = make(id);
            if by_code.insert(trimmed.to_string(), id).is_some() {
                return Err(ConfigError::invalid(
                    key,
                    format!("duplicate code '{trimmed}'"),
                ));
            }
            by_id
                .entry(id)
                .and_modify(|existing: &mut String| {
                    if trimmed < existing.as_str() {
                        *existing = trimmed.to_string();
                    }
                })
                .or_insert_with(|| trimmed.to_string());
        }

        Ok(Self { by_code, by_id })
    }

    fn lookup(&self, code: &str) -> Option<Id> {
        self.by_code.get(code.trim()).copied()
    }

    fn code_of(&self, id: Id) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }
}

/// Immutable product/branch code directory.
#[derive(Debug, Clone)]
pub struct IdentifierDirectory {
    products: CodeMap<ProductId>,
    branches: CodeMap<BranchId>,
}

impl IdentifierDirectory {
    pub fn from_config(config: &IdentifierConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            products: CodeMap::build("products", &config.products, ProductId::new)?,
            branches: CodeMap::build("branches", &config.branches, BranchId::new)?,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: IdentifierConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse {
                path: "<inline>".into(),
                reason: e.to_string(),
            })?;
        Self::from_config(&config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: IdentifierConfig =
            serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let directory = Self::from_config(&config)?;
        tracing::info!(
            path = %path.display(),
            products = config.products.len(),
            branches = config.branches.len(),
            "loaded identifier directory"
        );
        Ok(directory)
    }

    /// The built-in maps (three products, three branches).
    pub fn builtin() -> Self {
        let config = IdentifierConfig::default();
        // The built-in maps are static and valid by construction.
        Self {
            products: CodeMap {
                by_code: config
                    .products
                    .iter()
                    .map(|(c, id)| (c.clone(), ProductId::new(*id)))
                    .collect(),
                by_id: config
                    .products
                    .iter()
                    .map(|(c, id)| (ProductId::new(*id), c.clone()))
                    .collect(),
            },
            branches: CodeMap {
                by_code: config
                    .branches
                    .iter()
                    .map(|(c, id)| (c.clone(), BranchId::new(*id)))
                    .collect(),
                by_id: config
                    .branches
                    .iter()
                    .map(|(c, id)| (BranchId::new(*id), c.clone()))
                    .collect(),
            },
        }
    }

    pub fn product(&self, code: &str) -> Result<ProductId, DomainError> {
        self.products
            .lookup(code)
            .ok_or_else(|| DomainError::unknown_identifier("product", code.trim()))
    }

    pub fn branch(&self, name: &str) -> Result<BranchId, DomainError> {
        self.branches
            .lookup(name)
            .ok_or_else(|| DomainError::unknown_identifier("branch", name.trim()))
    }

    /// Resolve both codes; the product is checked first.
    pub fn resolve(
        &self,
        product_code: &str,
        branch_name: &str,
    ) -> Result<(ProductId, BranchId), DomainError> {
        Ok((self.product(product_code)?, self.branch(branch_name)?))
    }

    pub fn product_code(&self, id: ProductId) -> Option<&str> {
        self.products.code_of(id)
    }

    pub fn branch_name(&self, id: BranchId) -> Option<&str> {
        self.branches.code_of(id)
    }
}

impl Default for IdentifierDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}
