//! Public resource and request types.
//!
//! These are the provider-neutral shapes handed to and returned from
//! [`CdnProvider`](crate::CdnProvider). Wire documents live with each provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::log_sanitizer::mask_secret;

// ============ Resources ============

/// A cache policy as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachePolicy {
    /// Provider-assigned identifier.
    pub id: String,
    /// Sanitized policy name.
    pub name: String,
    /// Free-form comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Minimum TTL in seconds.
    pub min_ttl: u64,
    /// Default TTL in seconds.
    pub default_ttl: u64,
    /// Maximum TTL in seconds.
    pub max_ttl: u64,
    /// When the policy was last modified, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

/// An origin-request policy as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginRequestPolicy {
    /// Provider-assigned identifier.
    pub id: String,
    /// Sanitized policy name.
    pub name: String,
    /// Free-form comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// When the policy was last modified, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

/// A response-headers policy as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseHeadersPolicy {
    /// Provider-assigned identifier.
    pub id: String,
    /// Sanitized policy name.
    pub name: String,
    /// Free-form comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// When the policy was last modified, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

/// A distribution summary.
///
/// Distributions are identified by the hostname of their origin; the policy
/// IDs come from the default cache behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    /// Provider-assigned identifier.
    pub id: String,
    /// Full resource name.
    pub arn: String,
    /// Deployment status (`InProgress`, `Deployed`).
    pub status: String,
    /// Provider hostname, e.g. `d111111abcdef8.cloudfront.net`.
    pub domain_name: String,
    /// Whether the distribution accepts traffic.
    pub enabled: bool,
    /// Hostnames of the configured origins.
    pub origin_domains: Vec<String>,
    /// Alternate domain names (CNAMEs).
    pub aliases: Vec<String>,
    /// Cache policy referenced by the default cache behavior.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_policy_id: Option<String>,
    /// Origin-request policy referenced by the default cache behavior.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_request_policy_id: Option<String>,
    /// Response-headers policy referenced by the default cache behavior.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_headers_policy_id: Option<String>,
}

impl Distribution {
    /// Whether this distribution serves `domain`, either as an origin or as its
    /// provider hostname.
    pub fn serves(&self, domain: &str) -> bool {
        self.domain_name == domain || self.origin_domains.iter().any(|d| d == domain)
    }
}

// ============ Requests ============

/// Request to create a cache policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCachePolicyRequest {
    /// Raw policy name; sanitized by the provider.
    pub name: String,
    /// Minimum TTL in seconds.
    pub min_ttl: u64,
    /// Default TTL in seconds.
    pub default_ttl: u64,
    /// Maximum TTL in seconds.
    pub max_ttl: u64,
}

/// Custom domain and certificate attached to a distribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionAlias {
    /// Alternate domain name served by the distribution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// ACM certificate ARN covering `domain`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_arn: Option<String>,
}

impl DistributionAlias {
    /// An alias with neither field set behaves as no alias at all.
    pub fn is_empty(&self) -> bool {
        self.domain.as_deref().is_none_or(str::is_empty)
            && self.certificate_arn.as_deref().is_none_or(str::is_empty)
    }
}

/// Request to create a distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDistributionRequest {
    /// Origin hostname; also the distribution's identity.
    pub domain: String,
    /// Cache policy for the default cache behavior.
    pub cache_policy_id: String,
    /// Origin-request policy for the default cache behavior.
    pub origin_request_policy_id: String,
    /// Response-headers policy for the default cache behavior.
    pub response_headers_policy_id: String,
    /// Optional custom domain and certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<DistributionAlias>,
}

// ============ Credentials ============

/// Type-safe credential container for supported CDN providers.
///
/// Pass this to [`create_provider()`](crate::create_provider) to instantiate a provider.
///
/// # Serialization
///
/// Serialized as a tagged enum with `"provider"` as the tag and `"credentials"` as the content:
///
/// ```json
/// { "provider": "cloudfront", "credentials": { "access_key_id": "...", "region": "us-east-1" } }
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "provider", content = "credentials")]
pub enum ProviderCredentials {
    /// AWS CloudFront credentials.
    #[serde(rename = "cloudfront")]
    CloudFront {
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// STS session token for temporary credentials.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_token: Option<String>,
        /// Configured AWS region; selects the API partition.
        region: String,
    },
}

// 不要在日志里打印密钥
impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CloudFront {
                access_key_id,
                session_token,
                region,
                ..
            } => f
                .debug_struct("CloudFront")
                .field("access_key_id", &mask_secret(access_key_id))
                .field("secret_access_key", &"****")
                .field("session_token", &session_token.as_ref().map(|_| "****"))
                .field("region", region)
                .finish(),
        }
    }
}
