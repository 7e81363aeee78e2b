//! Low-stock alert rule and alert lifecycle.
//!
//! Lifecycle: `Created (unread) -> Read`, terminal at `Read`. Alerts are never
//! deleted or re-opened.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use novastock_core::{AlertId, BranchId, ProductId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertKind {
    LowStock,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::LowStock => "LowStock",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LowStock" => Some(AlertKind::LowStock),
            _ => None,
        }
    }
}

impl core::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs to a single low-stock evaluation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertCheck {
    pub branch_id: BranchId,
    pub product_id: ProductId,
    pub quantity_on_hand: u32,
    pub safety_stock: u32,
    pub reorder_quantity: u64,
}

impl AlertCheck {
    pub fn requires_alert(&self) -> bool {
        self.quantity_on_hand <= self.safety_stock && self.reorder_quantity > 0
    }
}

/// Human-facing names for the product and branch quoted in an alert message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertSubject {
    pub product: String,
    pub branch: String,
}

impl AlertSubject {
    pub fn new(product: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            branch: branch.into(),
        }
    }

    /// Fallback when no external codes are known: quote the numeric ids.
    pub fn from_ids(product_id: ProductId, branch_id: BranchId) -> Self {
        Self::new(product_id.to_string(), branch_id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertDecision {
    Raise { kind: AlertKind, message: String },
    NoAlert,
}

/// Decide whether a low-stock alert is needed.
///
/// Raised iff stock is at or below the safety buffer *and* a positive reorder
/// quantity exists. No history is consulted: re-evaluating an unchanged
/// condition raises again.
pub fn evaluate_low_stock(check: &AlertCheck, subject: &AlertSubject) -> AlertDecision {
    if !check.requires_alert() {
        return AlertDecision::NoAlert;
    }

    AlertDecision::Raise {
        kind: AlertKind::LowStock,
        message: format!(
            "Low stock for product {} at branch {}: {} on hand, safety stock {}. Reorder {} units.",
            subject.product,
            subject.branch,
            check.quantity_on_hand,
            check.safety_stock,
            check.reorder_quantity
        ),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    alert_id: AlertId,
    branch_id: BranchId,
    product_id: ProductId,
    kind: AlertKind,
    message: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl Alert {
    /// A freshly raised (unread) alert.
    pub fn raise(
        branch_id: BranchId,
        product_id: ProductId,
        kind: AlertKind,
        message: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            alert_id: AlertId::new(),
            branch_id,
            product_id,
            kind,
            message: message.into(),
            is_read: false,
            created_at,
        }
    }

    /// Rehydrate a stored alert (used by repositories).
    pub fn from_parts(
        alert_id: AlertId,
        branch_id: BranchId,
        product_id: ProductId,
        kind: AlertKind,
        message: String,
        is_read: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            alert_id,
            branch_id,
            product_id,
            kind,
            message,
            is_read,
            created_at,
        }
    }

    pub fn alert_id(&self) -> AlertId {
        self.alert_id
    }

    pub fn branch_id(&self) -> BranchId {
        self.branch_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn kind(&self) -> AlertKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_read(&self) -> bool {
        self.is_read
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Acknowledge the alert. Idempotent; there is no way back to unread.
    ///
    /// Returns `true` if this call changed the state.
    pub fn mark_read(&mut self) -> bool {
        let changed = !self.is_read;
        self.is_read = true;
        changed
    }

    /// Listing order: most recent first, alert id as tie-breaker.
    pub fn recency_key(&self) -> (DateTime<Utc>, AlertId) {
        (self.created_at, self.alert_id)
    }
}
