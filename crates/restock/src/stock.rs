use serde::{Deserialize, Serialize};

use novastock_core::{BranchId, ProductId};

/// Current stock level for one (product, branch) pair.
///
/// Externally owned ground truth; the restock pipeline only reads it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub product_id: ProductId,
    pub branch_id: BranchId,
    pub quantity_on_hand: u32,
    pub safety_stock: u32,
}

impl InventoryRecord {
    /// Stock at or below the safety buffer.
    pub fn is_at_or_below_safety_stock(&self) -> bool {
        self.quantity_on_hand <= self.safety_stock
    }

    /// Default buffer for seeded rows that carry no explicit safety stock:
    /// 20% of the on-hand quantity, truncated.
    pub fn default_safety_stock(quantity_on_hand: u32) -> u32 {
        (u64::from(quantity_on_hand) * 20 / 100) as u32
    }
}
