//! CDN Orchestrator Core Library
//!
//! Reconciles the CloudFront resources a web application needs, including:
//! - typed settings loaded from TOML and the environment ([`CdnSettings`])
//! - the ordered list of origin domains to put behind the CDN
//! - get-or-create reconciliation of policies and distributions ([`ReconcileService`])
//!
//! The provider is injected through [`ServiceContext`], so the same logic runs
//! against CloudFront or an in-memory catalog.

pub mod error;
pub mod services;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use services::{ReconcileService, ServiceContext};
pub use types::{CdnSettings, ReconcilePlan, ReconcileReport};
