//! `novastock-core`: shared identifiers and the domain error model.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

/// Upper bound for any persisted demand prediction.
pub const MAX_PREDICTED_DEMAND: u32 = 1_000_000;

pub use error::DomainError;
pub use id::{AlertId, BranchId, ForecastId, ProductId, RecommendationId};
