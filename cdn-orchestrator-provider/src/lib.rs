//! # cdn-orchestrator-provider
//!
//! A typed client for the CDN management resources needed to put a web
//! application behind a content delivery network.
//!
//! ## Supported Providers
//!
//! | Provider | Auth Method |
//! |----------|-------------|
//! | [AWS CloudFront](https://aws.amazon.com/cloudfront/) | AWS Signature Version 4 |
//!
//! ## Resources
//!
//! Every resource kind comes as a lookup/create pair on [`CdnProvider`]:
//!
//! - cache policies (TTLs, gzip/brotli, `Origin` header in the cache key)
//! - origin-request policies (`Origin` header and all query strings forwarded)
//! - response-headers policies (permissive CORS)
//! - distributions (one custom origin bound to the three policies, optional alias)
//!
//! Policies are looked up by their sanitized name (see [`sanitize_name`]),
//! distributions by their origin domain.
//!
//! ## Feature Flags
//!
//! - **`rustls`** *(default)* — Use rustls for TLS.
//! - **`native-tls`** — Use the platform's native TLS implementation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cdn_orchestrator_provider::{
//!     create_provider, CdnProvider, CreateCachePolicyRequest, ProviderCredentials,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = create_provider(ProviderCredentials::CloudFront {
//!         access_key_id: "your-access-key-id".to_string(),
//!         secret_access_key: "your-secret-access-key".to_string(),
//!         session_token: None,
//!         region: "us-east-1".to_string(),
//!     });
//!
//!     let name = "lms.example.com-cache-policy";
//!     let policy = match provider.get_cache_policy(name).await? {
//!         Some(existing) => existing,
//!         None => {
//!             provider
//!                 .create_cache_policy(&CreateCachePolicyRequest {
//!                     name: name.to_string(),
//!                     min_ttl: 0,
//!                     default_ttl: 300,
//!                     max_ttl: 3600,
//!                 })
//!                 .await?
//!         }
//!     };
//!     println!("{} -> {}", policy.name, policy.id);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All provider operations return [`Result<T, ProviderError>`](ProviderError).
//! The error enum provides structured variants for common failure modes:
//!
//! - [`ProviderError::InvalidCredentials`] — signature or key rejected
//! - [`ProviderError::ResourceExists`] — a resource with the same name already exists
//! - [`ProviderError::RateLimited`] — API rate limit exceeded (retryable)
//! - [`ProviderError::NetworkError`] — network connectivity issue (retryable)
//!
//! Transient errors (`NetworkError`, `Timeout`, `RateLimited`) are automatically
//! retried with exponential backoff. See [`ProviderError`] for the full list.

mod error;
mod factory;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export factory functions
pub use factory::create_provider;

// Re-export core trait only (internal traits are not exported)
pub use traits::CdnProvider;

// Re-export types
pub use types::{
    CachePolicy, CreateCachePolicyRequest, CreateDistributionRequest, Distribution,
    DistributionAlias, OriginRequestPolicy, ProviderCredentials, ResponseHeadersPolicy,
};

// Re-export name handling shared with callers
pub use providers::common::sanitize_name;

// Re-export utils module
pub use utils::log_sanitizer;

// Re-export concrete providers
pub use providers::{CloudFrontProvider, CloudFrontProviderBuilder};
