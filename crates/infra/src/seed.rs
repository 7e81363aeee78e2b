//! Inventory seed for the in-memory store.
//!
//! Stock levels are externally owned; in in-memory mode they come from a JSON
//! seed file shaped like:
//!
//! ```json
//! [
//!   { "product": "P0001", "branch": "Colombo", "quantity_on_hand": 120, "safety_stock": 24 },
//!   { "product": "P0002", "branch": "Kandy", "quantity_on_hand": 40 }
//! ]
//! ```
//!
//! Rows without `safety_stock` get the default buffer (20% of on-hand).

use std::path::Path;

use serde::Deserialize;

use novastock_restock::InventoryRecord;

use crate::config::ConfigError;
use crate::identifiers::IdentifierDirectory;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedRow {
    #[serde(alias = "product_id")]
    pub product: String,
    #[serde(alias = "branch_name")]
    pub branch: String,
    pub quantity_on_hand: u32,
    #[serde(default)]
    pub safety_stock: Option<u32>,
}

impl SeedRow {
    fn resolve(&self, directory: &IdentifierDirectory) -> Result<InventoryRecord, ConfigError> {
        let (product_id, branch_id) = directory
            .resolve(&self.product, &self.branch)
            .map_err(|e| ConfigError::invalid("INVENTORY_SEED_PATH", e.to_string()))?;
        Ok(InventoryRecord {
            product_id,
            branch_id,
            quantity_on_hand: self.quantity_on_hand,
            safety_stock: self
                .safety_stock
                .unwrap_or_else(|| InventoryRecord::default_safety_stock(self.quantity_on_hand)),
        })
    }
}

/// Resolve seed rows into inventory records.
///
/// Rows are kept in file order, so when loaded into a store the later row for
/// a key replaces the earlier one.
pub fn resolve_seed(
    rows: &[SeedRow],
    directory: &IdentifierDirectory,
) -> Result<Vec<InventoryRecord>, ConfigError> {
    rows.iter().map(|row| row.resolve(directory)).collect()
}

pub fn load_inventory_seed(
    path: impl AsRef<Path>,
    directory: &IdentifierDirectory,
) -> Result<Vec<InventoryRecord>, ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rows: Vec<SeedRow> = serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let records = resolve_seed(&rows, directory)?;
    tracing::info!(path = %path.display(), rows = records.len(), "loaded inventory seed");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use novastock_core::{BranchId, ProductId};

    use super::*;
    use crate::repositories::{InMemoryInventoryRepository, InventoryRepository};

    fn rows(json: &str) -> Vec<SeedRow> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn resolves_codes_and_defaults_safety_stock() {
        let dir = IdentifierDirectory::builtin();
        let records = resolve_seed(
            &rows(
                r#"[
                    { "product": "P0001", "branch": "Colombo",
                      "quantity_on_hand": 120, "safety_stock": 30 },
                    { "product": "P0002", "branch": "Kandy", "quantity_on_hand": 47 }
                ]"#,
            ),
            &dir,
        )
        .unwrap();

        assert_eq!(
            records,
            vec![
                InventoryRecord {
                    product_id: ProductId::new(1),
                    branch_id: BranchId::new(1),
                    quantity_on_hand: 120,
                    safety_stock: 30,
                },
                InventoryRecord {
                    product_id: ProductId::new(2),
                    branch_id: BranchId::new(2),
                    quantity_on_hand: 47,
                    safety_stock: 9,
                },
            ]
        );
    }

    #[tokio::test]
    async fn later_rows_for_the_same_key_win() {
        let dir = IdentifierDirectory::builtin();
        let records = resolve_seed(
            &rows(
                r#"[
                    { "product": "P0001", "branch": "Colombo",
                      "quantity_on_hand": 10, "safety_stock": 4 },
                    { "product": "P0001", "branch": "Colombo",
                      "quantity_on_hand": 99, "safety_stock": 1 }
                ]"#,
            ),
            &dir,
        )
        .unwrap();
        let repo = InMemoryInventoryRepository::with_records(records).unwrap();

        let stored = repo
            .get(ProductId::new(1), BranchId::new(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.quantity_on_hand, 99);
        assert_eq!(stored.safety_stock, 1);
        assert_eq!(repo.list_branch(BranchId::new(1)).await.unwrap().len(), 1);
    }

    #[test]
    fn unknown_codes_reject_the_seed() {
        let dir = IdentifierDirectory::builtin();
        let err = resolve_seed(
            &rows(r#"[{ "product": "P0404", "branch": "Colombo", "quantity_on_hand": 1 }]"#),
            &dir,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "INVENTORY_SEED_PATH", .. }));
    }

    #[test]
    fn negative_quantities_do_not_parse() {
        let parsed: Result<Vec<SeedRow>, _> = serde_json::from_str(
            r#"[{ "product": "P0001", "branch": "Colombo", "quantity_on_hand": -5 }]"#,
        );
        assert!(parsed.is_err());
    }
}
