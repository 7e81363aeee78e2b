use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use novastock_core::{BranchId, DomainError, ProductId, RecommendationId};

use crate::forecast::Forecast;
use crate::stock::InventoryRecord;

/// Single-period reorder rule.
///
/// When the predicted demand exceeds what is on hand, reorder the shortfall plus
/// the safety buffer; otherwise reorder nothing. Computed in `u64` so the sum
/// cannot overflow for any pair of `u32` inputs.
pub fn reorder_quantity(predicted_demand: u32, quantity_on_hand: u32, safety_stock: u32) -> u64 {
    if predicted_demand > quantity_on_hand {
        u64::from(predicted_demand - quantity_on_hand) + u64::from(safety_stock)
    } else {
        0
    }
}

/// A recommendation waiting to be appended to the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecommendation {
    pub branch_id: BranchId,
    pub product_id: ProductId,
    pub predicted_demand: u32,
    pub quantity_on_hand: u32,
    pub safety_stock: u32,
    pub recommended_reorder_quantity: u64,
    pub created_at: DateTime<Utc>,
}

impl NewRecommendation {
    /// Combine the current forecast with the current stock level.
    pub fn compute(
        forecast: &Forecast,
        stock: &InventoryRecord,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if forecast.product_id != stock.product_id || forecast.branch_id != stock.branch_id {
            return Err(DomainError::validation(format!(
                "forecast key ({}, {}) does not match inventory key ({}, {})",
                forecast.product_id, forecast.branch_id, stock.product_id, stock.branch_id
            )));
        }

        Ok(Self {
            branch_id: stock.branch_id,
            product_id: stock.product_id,
            predicted_demand: forecast.predicted_demand,
            quantity_on_hand: stock.quantity_on_hand,
            safety_stock: stock.safety_stock,
            recommended_reorder_quantity: reorder_quantity(
                forecast.predicted_demand,
                stock.quantity_on_hand,
                stock.safety_stock,
            ),
            created_at,
        })
    }

    pub fn into_stored(self, recommendation_id: RecommendationId) -> ReorderRecommendation {
        ReorderRecommendation {
            recommendation_id,
            branch_id: self.branch_id,
            product_id: self.product_id,
            predicted_demand: self.predicted_demand,
            quantity_on_hand: self.quantity_on_hand,
            safety_stock: self.safety_stock,
            recommended_reorder_quantity: self.recommended_reorder_quantity,
            created_at: self.created_at,
        }
    }
}

/// A persisted recommendation (append-only log row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderRecommendation {
    pub recommendation_id: RecommendationId,
    pub branch_id: BranchId,
    pub product_id: ProductId,
    pub predicted_demand: u32,
    pub quantity_on_hand: u32,
    pub safety_stock: u32,
    pub recommended_reorder_quantity: u64,
    pub created_at: DateTime<Utc>,
}
