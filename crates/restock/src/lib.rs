//! Restock decision domain.
//!
//! This crate contains the business rules of the forecast-to-action pipeline,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage):
//! forecast ledger rows, inventory levels, reorder quantities and low-stock alerts.

pub mod alert;
pub mod forecast;
pub mod reorder;
pub mod stock;

pub use alert::{Alert, AlertCheck, AlertDecision, AlertKind, AlertSubject, evaluate_low_stock};
pub use forecast::{Forecast, NewForecast};
pub use reorder::{NewRecommendation, ReorderRecommendation, reorder_quantity};
pub use stock::InventoryRecord;
