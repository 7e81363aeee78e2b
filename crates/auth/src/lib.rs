//! `novastock-auth`: role-scoped access policy for alert review.
//!
//! This crate is intentionally decoupled from HTTP and storage: it turns a
//! caller's role (and branch, when required) into an [`AlertScope`] that
//! repositories can filter by.

pub mod authorize;
pub mod roles;

pub use authorize::{AccessError, AlertScope, authorize_alert_access};
pub use roles::Role;
