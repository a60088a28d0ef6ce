//! CloudFront XML documents.
//!
//! Request documents serialize in the element order required by the
//! `2020-05-31` schema. Response documents are lean read views: they declare
//! only what the provider reads, so policies with other shapes still parse.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::providers::common::sanitize_name;
use crate::types::{
    CachePolicy, CreateDistributionRequest, Distribution, OriginRequestPolicy,
    ResponseHeadersPolicy,
};

use super::XML_NAMESPACE;

// ============ Shared pieces ============

/// `Quantity` + optional `Items` pair used all over the CloudFront schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Quantified<T> {
    #[serde(rename = "Quantity")]
    pub quantity: usize,
    #[serde(rename = "Items", skip_serializing_if = "Option::is_none")]
    pub items: Option<T>,
}

impl<T> Quantified<T> {
    fn of(quantity: usize, items: T) -> Self {
        Self {
            quantity,
            items: Some(items),
        }
    }
}

/// Generates an `Items` wrapper whose children repeat under one element name.
macro_rules! item_list {
    ($name:ident, $element:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
        pub(crate) struct $name {
            #[serde(rename = $element)]
            pub values: Vec<String>,
        }

        impl $name {
            fn quantified<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Quantified<Self> {
                let values: Vec<String> = values.into_iter().map(Into::into).collect();
                Quantified::of(values.len(), Self { values })
            }
        }
    };
}

item_list!(HeaderNames, "Name");
item_list!(CorsOrigins, "Origin");
item_list!(CorsHeaders, "Header");
item_list!(Methods, "Method");
item_list!(SslProtocols, "SslProtocol");
item_list!(Cnames, "CNAME");

/// Headers forwarded to the origin and included in the cache key.
const FORWARDED_HEADERS: [&str; 1] = ["Origin"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct HeadersConfig {
    pub header_behavior: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Quantified<HeaderNames>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CookiesConfig {
    pub cookie_behavior: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct QueryStringsConfig {
    pub query_string_behavior: String,
}

fn whitelisted_headers() -> HeadersConfig {
    HeadersConfig {
        header_behavior: "whitelist".to_string(),
        headers: Some(HeaderNames::quantified(FORWARDED_HEADERS)),
    }
}

fn no_cookies() -> CookiesConfig {
    CookiesConfig {
        cookie_behavior: "none".to_string(),
    }
}

fn all_query_strings() -> QueryStringsConfig {
    QueryStringsConfig {
        query_string_behavior: "all".to_string(),
    }
}

// ============ Cache policy ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ParametersInCacheKey {
    pub enable_accept_encoding_gzip: bool,
    pub enable_accept_encoding_brotli: bool,
    pub headers_config: HeadersConfig,
    pub cookies_config: CookiesConfig,
    pub query_strings_config: QueryStringsConfig,
}

/// `CachePolicyConfig` request document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CachePolicyConfig {
    #[serde(rename = "@xmlns")]
    pub xmlns: &'static str,
    pub comment: String,
    pub name: String,
    #[serde(rename = "DefaultTTL")]
    pub default_ttl: u64,
    #[serde(rename = "MaxTTL")]
    pub max_ttl: u64,
    #[serde(rename = "MinTTL")]
    pub min_ttl: u64,
    #[serde(rename = "ParametersInCacheKeyAndForwardedToOrigin")]
    pub parameters: ParametersInCacheKey,
}

impl CachePolicyConfig {
    pub(crate) fn new(name: &str, min_ttl: u64, default_ttl: u64, max_ttl: u64) -> Self {
        Self {
            xmlns: XML_NAMESPACE,
            comment: format!("CloudFront cache policy for {name}."),
            name: sanitize_name(name),
            default_ttl,
            max_ttl,
            min_ttl,
            parameters: ParametersInCacheKey {
                enable_accept_encoding_gzip: true,
                enable_accept_encoding_brotli: true,
                headers_config: whitelisted_headers(),
                cookies_config: no_cookies(),
                query_strings_config: all_query_strings(),
            },
        }
    }
}

// ============ Origin request policy ============

/// `OriginRequestPolicyConfig` request document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct OriginRequestPolicyConfig {
    #[serde(rename = "@xmlns")]
    pub xmlns: &'static str,
    pub comment: String,
    pub name: String,
    pub headers_config: HeadersConfig,
    pub cookies_config: CookiesConfig,
    pub query_strings_config: QueryStringsConfig,
}

impl OriginRequestPolicyConfig {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            xmlns: XML_NAMESPACE,
            comment: format!("CloudFront origin request policy for {name}."),
            name: sanitize_name(name),
            headers_config: whitelisted_headers(),
            cookies_config: no_cookies(),
            query_strings_config: all_query_strings(),
        }
    }
}

// ============ Response headers policy ============

/// CORS preflight max age: 30 days.
const CORS_MAX_AGE_SECS: u64 = 2_592_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CorsConfig {
    pub access_control_allow_origins: Quantified<CorsOrigins>,
    pub access_control_allow_headers: Quantified<CorsHeaders>,
    pub access_control_allow_methods: Quantified<Methods>,
    pub access_control_allow_credentials: bool,
    pub access_control_max_age_sec: u64,
    pub origin_override: bool,
}

/// `ResponseHeadersPolicyConfig` request document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ResponseHeadersPolicyConfig {
    #[serde(rename = "@xmlns")]
    pub xmlns: &'static str,
    pub comment: String,
    pub name: String,
    pub cors_config: CorsConfig,
}

impl ResponseHeadersPolicyConfig {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            xmlns: XML_NAMESPACE,
            comment: format!("CloudFront response headers policy for {name}."),
            name: sanitize_name(name),
            cors_config: CorsConfig {
                access_control_allow_origins: CorsOrigins::quantified(["*"]),
                access_control_allow_headers: CorsHeaders::quantified(["*"]),
                access_control_allow_methods: Methods::quantified(["ALL"]),
                access_control_allow_credentials: false,
                access_control_max_age_sec: CORS_MAX_AGE_SECS,
                origin_override: true,
            },
        }
    }
}

// ============ Distribution ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CustomOriginConfig {
    #[serde(rename = "HTTPPort")]
    pub http_port: u16,
    #[serde(rename = "HTTPSPort")]
    pub https_port: u16,
    pub origin_protocol_policy: String,
    pub origin_ssl_protocols: Quantified<SslProtocols>,
    pub origin_read_timeout: u32,
    pub origin_keepalive_timeout: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Origin {
    pub id: String,
    pub domain_name: String,
    pub custom_origin_config: CustomOriginConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct OriginItems {
    #[serde(rename = "Origin")]
    pub origins: Vec<Origin>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct AllowedMethods {
    pub quantity: usize,
    pub items: Methods,
    pub cached_methods: Quantified<Methods>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct DefaultCacheBehavior {
    pub target_origin_id: String,
    pub viewer_protocol_policy: String,
    pub allowed_methods: AllowedMethods,
    pub compress: bool,
    pub cache_policy_id: String,
    pub origin_request_policy_id: String,
    pub response_headers_policy_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ViewerCertificate {
    pub cloud_front_default_certificate: bool,
    #[serde(rename = "ACMCertificateArn", skip_serializing_if = "Option::is_none")]
    pub acm_certificate_arn: Option<String>,
    #[serde(rename = "SSLSupportMethod")]
    pub ssl_support_method: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GeoRestriction {
    pub restriction_type: String,
    pub quantity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Restrictions {
    pub geo_restriction: GeoRestriction,
}

/// `DistributionConfig` request document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct DistributionConfig {
    #[serde(rename = "@xmlns")]
    pub xmlns: &'static str,
    pub caller_reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Quantified<Cnames>>,
    pub origins: Quantified<OriginItems>,
    pub default_cache_behavior: DefaultCacheBehavior,
    pub comment: String,
    pub enabled: bool,
    pub viewer_certificate: ViewerCertificate,
    pub restrictions: Restrictions,
    #[serde(rename = "IsIPV6Enabled")]
    pub is_ipv6_enabled: bool,
    pub staging: bool,
}

impl DistributionConfig {
    /// Assemble the distribution document for a single custom origin.
    ///
    /// An alias with neither field set is treated as no alias.
    pub(crate) fn new(req: &CreateDistributionRequest, caller_reference: String) -> Self {
        let alias = req.alias.as_ref().filter(|a| !a.is_empty());
        let alias_domain = alias
            .and_then(|a| a.domain.clone())
            .filter(|d| !d.is_empty());
        let certificate_arn = alias
            .and_then(|a| a.certificate_arn.clone())
            .filter(|arn| !arn.is_empty());

        let get_head = || Methods {
            values: vec!["GET".to_string(), "HEAD".to_string()],
        };

        Self {
            xmlns: XML_NAMESPACE,
            caller_reference,
            aliases: alias_domain.map(|d| Cnames::quantified([d])),
            origins: Quantified::of(
                1,
                OriginItems {
                    origins: vec![Origin {
                        id: req.domain.clone(),
                        domain_name: req.domain.clone(),
                        custom_origin_config: CustomOriginConfig {
                            http_port: 80,
                            https_port: 443,
                            origin_protocol_policy: "match-viewer".to_string(),
                            origin_ssl_protocols: SslProtocols::quantified([
                                "TLSv1", "TLSv1.1", "TLSv1.2",
                            ]),
                            origin_read_timeout: 30,
                            origin_keepalive_timeout: 5,
                        },
                    }],
                },
            ),
            default_cache_behavior: DefaultCacheBehavior {
                target_origin_id: req.domain.clone(),
                viewer_protocol_policy: "redirect-to-https".to_string(),
                allowed_methods: AllowedMethods {
                    quantity: 2,
                    items: get_head(),
                    cached_methods: Quantified::of(2, get_head()),
                },
                compress: true,
                cache_policy_id: req.cache_policy_id.clone(),
                origin_request_policy_id: req.origin_request_policy_id.clone(),
                response_headers_policy_id: req.response_headers_policy_id.clone(),
            },
            comment: format!("Distribution config for {}", req.domain),
            enabled: true,
            viewer_certificate: ViewerCertificate {
                cloud_front_default_certificate: alias.is_none(),
                acm_certificate_arn: certificate_arn,
                ssl_support_method: if alias.is_some() {
                    "sni-only".to_string()
                } else {
                    "static-ip".to_string()
                },
            },
            restrictions: Restrictions {
                geo_restriction: GeoRestriction {
                    restriction_type: "none".to_string(),
                    quantity: 0,
                },
            },
            is_ipv6_enabled: true,
            staging: false,
        }
    }
}

// ============ Response views ============

/// A page of a list call.
pub(crate) trait ListPage {
    type Item;

    /// Marker for the next page, if more items remain.
    fn next_marker(&self) -> Option<&str>;

    fn into_items(self) -> Vec<Self::Item>;
}

fn non_empty(marker: Option<&String>) -> Option<&str> {
    marker.map(String::as_str).filter(|m| !m.is_empty())
}

/// Common fields of every policy config, as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PolicyConfigView {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Comment", default)]
    pub comment: Option<String>,
    #[serde(rename = "MinTTL", default)]
    pub min_ttl: u64,
    #[serde(rename = "DefaultTTL", default)]
    pub default_ttl: u64,
    #[serde(rename = "MaxTTL", default)]
    pub max_ttl: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CachePolicyView {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(
        rename = "LastModifiedTime",
        default,
        deserialize_with = "crate::utils::datetime::deserialize"
    )]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(rename = "CachePolicyConfig")]
    pub config: PolicyConfigView,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OriginRequestPolicyView {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(
        rename = "LastModifiedTime",
        default,
        deserialize_with = "crate::utils::datetime::deserialize"
    )]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(rename = "OriginRequestPolicyConfig")]
    pub config: PolicyConfigView,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ResponseHeadersPolicyView {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(
        rename = "LastModifiedTime",
        default,
        deserialize_with = "crate::utils::datetime::deserialize"
    )]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(rename = "ResponseHeadersPolicyConfig")]
    pub config: PolicyConfigView,
}

impl From<CachePolicyView> for CachePolicy {
    fn from(view: CachePolicyView) -> Self {
        Self {
            id: view.id,
            name: view.config.name,
            comment: view.config.comment,
            min_ttl: view.config.min_ttl,
            default_ttl: view.config.default_ttl,
            max_ttl: view.config.max_ttl,
            last_modified: view.last_modified,
        }
    }
}

impl From<OriginRequestPolicyView> for OriginRequestPolicy {
    fn from(view: OriginRequestPolicyView) -> Self {
        Self {
            id: view.id,
            name: view.config.name,
            comment: view.config.comment,
            last_modified: view.last_modified,
        }
    }
}

impl From<ResponseHeadersPolicyView> for ResponseHeadersPolicy {
    fn from(view: ResponseHeadersPolicyView) -> Self {
        Self {
            id: view.id,
            name: view.config.name,
            comment: view.config.comment,
            last_modified: view.last_modified,
        }
    }
}

/// Generates a policy list page: `<XList><NextMarker/><Items><XSummary><X>..`.
macro_rules! policy_list {
    ($list:ident, $items:ident, $summary:ident, $summary_tag:literal, $view:ident, $view_tag:literal) => {
        #[derive(Debug, Clone, Deserialize)]
        pub(crate) struct $summary {
            #[serde(rename = $view_tag)]
            pub policy: $view,
        }

        #[derive(Debug, Clone, Default, Deserialize)]
        pub(crate) struct $items {
            #[serde(rename = $summary_tag, default)]
            pub summaries: Vec<$summary>,
        }

        #[derive(Debug, Clone, Deserialize)]
        pub(crate) struct $list {
            #[serde(rename = "NextMarker", default)]
            pub next_marker: Option<String>,
            #[serde(rename = "Items", default)]
            pub items: Option<$items>,
        }

        impl ListPage for $list {
            type Item = $view;

            fn next_marker(&self) -> Option<&str> {
                non_empty(self.next_marker.as_ref())
            }

            fn into_items(self) -> Vec<$view> {
                self.items
                    .map(|i| i.summaries.into_iter().map(|s| s.policy).collect())
                    .unwrap_or_default()
            }
        }
    };
}

policy_list!(
    CachePolicyList,
    CachePolicySummaries,
    CachePolicySummary,
    "CachePolicySummary",
    CachePolicyView,
    "CachePolicy"
);
policy_list!(
    OriginRequestPolicyList,
    OriginRequestPolicySummaries,
    OriginRequestPolicySummary,
    "OriginRequestPolicySummary",
    OriginRequestPolicyView,
    "OriginRequestPolicy"
);
policy_list!(
    ResponseHeadersPolicyList,
    ResponseHeadersPolicySummaries,
    ResponseHeadersPolicySummary,
    "ResponseHeadersPolicySummary",
    ResponseHeadersPolicyView,
    "ResponseHeadersPolicy"
);

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CnameItemsView {
    #[serde(rename = "CNAME", default)]
    pub cnames: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct AliasesView {
    #[serde(rename = "Items", default)]
    pub items: Option<CnameItemsView>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OriginView {
    #[serde(rename = "DomainName")]
    pub domain_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct OriginItemsView {
    #[serde(rename = "Origin", default)]
    pub origins: Vec<OriginView>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct OriginsView {
    #[serde(rename = "Items", default)]
    pub items: Option<OriginItemsView>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CacheBehaviorView {
    #[serde(rename = "CachePolicyId", default)]
    pub cache_policy_id: Option<String>,
    #[serde(rename = "OriginRequestPolicyId", default)]
    pub origin_request_policy_id: Option<String>,
    #[serde(rename = "ResponseHeadersPolicyId", default)]
    pub response_headers_policy_id: Option<String>,
}

/// Parts of `Distribution/DistributionConfig` the provider reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct DistributionShapeView {
    #[serde(rename = "Aliases", default)]
    pub aliases: AliasesView,
    #[serde(rename = "Origins", default)]
    pub origins: OriginsView,
    #[serde(rename = "DefaultCacheBehavior", default)]
    pub default_cache_behavior: CacheBehaviorView,
    #[serde(rename = "Enabled", default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DistributionSummary {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "ARN", default)]
    pub arn: String,
    #[serde(rename = "Status", default)]
    pub status: String,
    #[serde(rename = "DomainName", default)]
    pub domain_name: String,
    #[serde(rename = "Aliases", default)]
    pub aliases: AliasesView,
    #[serde(rename = "Origins", default)]
    pub origins: OriginsView,
    #[serde(rename = "DefaultCacheBehavior", default)]
    pub default_cache_behavior: CacheBehaviorView,
    #[serde(rename = "Enabled", default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct DistributionSummaries {
    #[serde(rename = "DistributionSummary", default)]
    pub summaries: Vec<DistributionSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DistributionList {
    #[serde(rename = "IsTruncated", default)]
    pub is_truncated: bool,
    #[serde(rename = "NextMarker", default)]
    pub next_marker: Option<String>,
    #[serde(rename = "Items", default)]
    pub items: Option<DistributionSummaries>,
}

impl ListPage for DistributionList {
    type Item = DistributionSummary;

    fn next_marker(&self) -> Option<&str> {
        if self.is_truncated {
            non_empty(self.next_marker.as_ref())
        } else {
            None
        }
    }

    fn into_items(self) -> Vec<DistributionSummary> {
        self.items.map(|i| i.summaries).unwrap_or_default()
    }
}

/// Body of a successful `CreateDistribution` call.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DistributionView {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "ARN", default)]
    pub arn: String,
    #[serde(rename = "Status", default)]
    pub status: String,
    #[serde(rename = "DomainName", default)]
    pub domain_name: String,
    #[serde(rename = "DistributionConfig", default)]
    pub config: DistributionShapeView,
}

fn into_distribution(
    id: String,
    arn: String,
    status: String,
    domain_name: String,
    shape: DistributionShapeView,
) -> Distribution {
    Distribution {
        id,
        arn,
        status,
        domain_name,
        enabled: shape.enabled,
        origin_domains: shape
            .origins
            .items
            .map(|i| i.origins.into_iter().map(|o| o.domain_name).collect())
            .unwrap_or_default(),
        aliases: shape.aliases.items.map(|i| i.cnames).unwrap_or_default(),
        cache_policy_id: shape.default_cache_behavior.cache_policy_id,
        origin_request_policy_id: shape.default_cache_behavior.origin_request_policy_id,
        response_headers_policy_id: shape.default_cache_behavior.response_headers_policy_id,
    }
}

impl From<DistributionSummary> for Distribution {
    fn from(s: DistributionSummary) -> Self {
        let shape = DistributionShapeView {
            aliases: s.aliases,
            origins: s.origins,
            default_cache_behavior: s.default_cache_behavior,
            enabled: s.enabled,
        };
        into_distribution(s.id, s.arn, s.status, s.domain_name, shape)
    }
}

impl From<DistributionView> for Distribution {
    fn from(v: DistributionView) -> Self {
        into_distribution(v.id, v.arn, v.status, v.domain_name, v.config)
    }
}

/// CloudFront error body: `<ErrorResponse><Error><Code/><Message/></Error></ErrorResponse>`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(rename = "Error")]
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(rename = "Code", default)]
    pub code: Option<String>,
    #[serde(rename = "Message", default)]
    pub message: Option<String>,
}
