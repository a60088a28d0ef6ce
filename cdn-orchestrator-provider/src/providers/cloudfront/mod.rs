//! AWS CloudFront Provider

mod error;
mod http;
mod provider;
mod sign;
/// CloudFront API-specific request/response documents.
pub(crate) mod types;

use reqwest::Client;

use crate::providers::common::create_http_client;

/// CloudFront management API version used in every request path.
pub(crate) const API_VERSION: &str = "2020-05-31";
/// XML namespace of the configuration documents.
pub(crate) const XML_NAMESPACE: &str = "http://cloudfront.amazonaws.com/doc/2020-05-31/";
/// SigV4 service name.
pub(crate) const SIGNING_SERVICE: &str = "cloudfront";

/// Global endpoint host, signed for `us-east-1`.
const GLOBAL_HOST: &str = "cloudfront.amazonaws.com";
const GLOBAL_SIGNING_REGION: &str = "us-east-1";
/// China partition endpoint host, signed for `cn-northwest-1`.
const CHINA_HOST: &str = "cloudfront.cn-northwest-1.amazonaws.com.cn";
const CHINA_SIGNING_REGION: &str = "cn-northwest-1";

/// Resolved API endpoint.
///
/// CloudFront is a global service: the configured region only selects the
/// partition, never the host within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Endpoint {
    pub host: &'static str,
    pub signing_region: &'static str,
}

impl Endpoint {
    pub(crate) fn for_region(region: &str) -> Self {
        if region.starts_with("cn-") {
            Self {
                host: CHINA_HOST,
                signing_region: CHINA_SIGNING_REGION,
            }
        } else {
            Self {
                host: GLOBAL_HOST,
                signing_region: GLOBAL_SIGNING_REGION,
            }
        }
    }
}

/// AWS CloudFront provider implementation.
///
/// Authenticates via AWS Signature Version 4.
///
/// # Construction
///
/// ```rust,no_run
/// use cdn_orchestrator_provider::CloudFrontProvider;
///
/// let provider = CloudFrontProvider::builder(
///     "your-access-key-id".to_string(),
///     "your-secret-access-key".to_string(),
/// )
/// .region("eu-west-1")
/// .max_retries(3)
/// .build();
/// ```
pub struct CloudFrontProvider {
    pub(crate) client: Client,
    pub(crate) access_key_id: String,
    pub(crate) secret_access_key: String,
    pub(crate) session_token: Option<String>,
    pub(crate) endpoint: Endpoint,
    pub(crate) max_retries: u32,
}

/// Builder for [`CloudFrontProvider`] with configurable region, session token and retry behavior.
pub struct CloudFrontProviderBuilder {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
    region: String,
    max_retries: u32,
}

impl CloudFrontProviderBuilder {
    fn new(access_key_id: String, secret_access_key: String) -> Self {
        Self {
            access_key_id,
            secret_access_key,
            session_token: None,
            region: GLOBAL_SIGNING_REGION.to_string(),
            max_retries: 2,
        }
    }

    /// Set the configured AWS region (default: `us-east-1`).
    ///
    /// `cn-*` regions select the China partition; anything else uses the global endpoint.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set an STS session token for temporary credentials.
    ///
    /// Empty tokens are ignored.
    pub fn session_token(mut self, token: Option<String>) -> Self {
        self.session_token = token.filter(|t| !t.is_empty());
        self
    }

    /// Set the maximum number of automatic retries for transient errors (default: 2).
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Build the [`CloudFrontProvider`] instance.
    pub fn build(self) -> CloudFrontProvider {
        let endpoint = Endpoint::for_region(&self.region);
        log::debug!(
            "CloudFront endpoint for region {}: {} (signing region {})",
            self.region,
            endpoint.host,
            endpoint.signing_region
        );
        CloudFrontProvider {
            client: create_http_client(),
            access_key_id: self.access_key_id,
            secret_access_key: self.secret_access_key,
            session_token: self.session_token,
            endpoint,
            max_retries: self.max_retries,
        }
    }
}

impl CloudFrontProvider {
    /// Creates a new CloudFront provider with default settings (global endpoint, 2 retries).
    pub fn new(access_key_id: String, secret_access_key: String) -> Self {
        Self::builder(access_key_id, secret_access_key).build()
    }

    /// Returns a builder for customizing the provider configuration.
    pub fn builder(access_key_id: String, secret_access_key: String) -> CloudFrontProviderBuilder {
        CloudFrontProviderBuilder::new(access_key_id, secret_access_key)
    }
}
