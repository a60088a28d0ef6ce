//! CDN Provider implementations

/// Shared utilities used by provider implementations.
pub mod common;

mod cloudfront;

pub use cloudfront::{CloudFrontProvider, CloudFrontProviderBuilder};
