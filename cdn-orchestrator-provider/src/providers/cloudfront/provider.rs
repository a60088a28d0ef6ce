//! CloudFront `CdnProvider` trait implementation

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{ProviderError, Result};
use crate::providers::common::sanitize_name;
use crate::traits::{CdnProvider, ErrorContext, ProviderErrorMapper};
use crate::types::{
    CachePolicy, CreateCachePolicyRequest, CreateDistributionRequest, Distribution,
    OriginRequestPolicy, ResponseHeadersPolicy,
};

use super::CloudFrontProvider;
use super::types::{
    CachePolicyConfig, CachePolicyList, CachePolicyView, DistributionConfig, DistributionList,
    DistributionView, ListPage, OriginRequestPolicyConfig, OriginRequestPolicyList,
    OriginRequestPolicyView, ResponseHeadersPolicyConfig, ResponseHeadersPolicyList,
    ResponseHeadersPolicyView,
};

const CACHE_POLICY: &str = "cache-policy";
const ORIGIN_REQUEST_POLICY: &str = "origin-request-policy";
const RESPONSE_HEADERS_POLICY: &str = "response-headers-policy";
const DISTRIBUTION: &str = "distribution";

/// Walk a paged list and return the first item accepted by `matches`.
///
/// `fetch` receives the marker of the page to load (`None` for the first).
/// Stops early on a match. A marker that repeats is treated as the end of
/// the list.
async fn walk_pages<L, T, Fetch, Fut, M>(
    resource: &str,
    mut fetch: Fetch,
    matches: M,
) -> Result<Option<T>>
where
    L: ListPage,
    T: From<L::Item>,
    Fetch: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<L>>,
    M: Fn(&T) -> bool,
{
    let mut marker: Option<String> = None;
    let mut page = 1_u32;

    loop {
        let list = fetch(marker.clone()).await?;
        let next = list.next_marker().map(str::to_string);

        if let Some(found) = list.into_items().into_iter().map(T::from).find(&matches) {
            log::debug!("{resource}: match found on page {page}");
            return Ok(Some(found));
        }

        match next {
            Some(next) if marker.as_deref() != Some(next.as_str()) => {
                marker = Some(next);
                page += 1;
            }
            _ => {
                log::debug!("{resource}: no match in {page} page(s)");
                return Ok(None);
            }
        }
    }
}

impl CloudFrontProvider {
    /// Load one page of a list call.
    async fn list_page<L>(
        &self,
        resource: &str,
        custom_only: bool,
        marker: Option<String>,
    ) -> Result<L>
    where
        L: DeserializeOwned,
    {
        let mut query: Vec<(&str, &str)> = Vec::with_capacity(2);
        if custom_only {
            query.push(("Type", "custom"));
        }
        if let Some(m) = marker.as_deref() {
            query.push(("Marker", m));
        }
        self.get(resource, &query, ErrorContext::default()).await
    }

    /// Walk every page of a list call and return the first item accepted by `matches`.
    async fn find_in_pages<L, T, F>(
        &self,
        resource: &str,
        custom_only: bool,
        matches: F,
    ) -> Result<Option<T>>
    where
        L: ListPage + DeserializeOwned + Send,
        T: From<L::Item> + Send,
        F: Fn(&T) -> bool + Send + Sync,
    {
        walk_pages(
            resource,
            |marker| self.list_page::<L>(resource, custom_only, marker),
            matches,
        )
        .await
    }

    /// A certificate only makes sense together with an alias domain.
    fn check_alias(&self, req: &CreateDistributionRequest) -> Result<()> {
        let Some(alias) = &req.alias else {
            return Ok(());
        };
        let has_domain = alias.domain.as_deref().is_some_and(|d| !d.is_empty());
        let has_certificate = alias
            .certificate_arn
            .as_deref()
            .is_some_and(|arn| !arn.is_empty());

        if has_certificate && !has_domain {
            return Err(ProviderError::InvalidParameter {
                provider: self.provider_name().to_string(),
                param: "alias".to_string(),
                detail: format!(
                    "certificate ARN given for {} without an alias domain",
                    req.domain
                ),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CdnProvider for CloudFrontProvider {
    fn id(&self) -> &'static str {
        "cloudfront"
    }

    async fn get_cache_policy(&self, name: &str) -> Result<Option<CachePolicy>> {
        let wanted = sanitize_name(name);
        self.find_in_pages::<CachePolicyList, CachePolicy, _>(CACHE_POLICY, true, |p| {
            p.name == wanted
        })
        .await
    }

    async fn create_cache_policy(&self, req: &CreateCachePolicyRequest) -> Result<CachePolicy> {
        let config = CachePolicyConfig::new(&req.name, req.min_ttl, req.default_ttl, req.max_ttl);
        let ctx = ErrorContext::resource(config.name.clone());

        let view: CachePolicyView = self
            .post(CACHE_POLICY, "CachePolicyConfig", &config, ctx)
            .await?;
        let policy = CachePolicy::from(view);

        log::info!(
            "[{}] Created cache policy {} ({})",
            self.provider_name(),
            policy.name,
            policy.id
        );
        Ok(policy)
    }

    async fn get_origin_request_policy(&self, name: &str) -> Result<Option<OriginRequestPolicy>> {
        let wanted = sanitize_name(name);
        self.find_in_pages::<OriginRequestPolicyList, OriginRequestPolicy, _>(
            ORIGIN_REQUEST_POLICY,
            true,
            |p| p.name == wanted,
        )
        .await
    }

    async fn create_origin_request_policy(&self, name: &str) -> Result<OriginRequestPolicy> {
        let config = OriginRequestPolicyConfig::new(name);
        let ctx = ErrorContext::resource(config.name.clone());

        let view: OriginRequestPolicyView = self
            .post(ORIGIN_REQUEST_POLICY, "OriginRequestPolicyConfig", &config, ctx)
            .await?;
        let policy = OriginRequestPolicy::from(view);

        log::info!(
            "[{}] Created origin request policy {} ({})",
            self.provider_name(),
            policy.name,
            policy.id
        );
        Ok(policy)
    }

    async fn get_response_headers_policy(
        &self,
        name: &str,
    ) -> Result<Option<ResponseHeadersPolicy>> {
        let wanted = sanitize_name(name);
        self.find_in_pages::<ResponseHeadersPolicyList, ResponseHeadersPolicy, _>(
            RESPONSE_HEADERS_POLICY,
            true,
            |p| p.name == wanted,
        )
        .await
    }

    async fn create_response_headers_policy(&self, name: &str) -> Result<ResponseHeadersPolicy> {
        let config = ResponseHeadersPolicyConfig::new(name);
        let ctx = ErrorContext::resource(config.name.clone());

        let view: ResponseHeadersPolicyView = self
            .post(RESPONSE_HEADERS_POLICY, "ResponseHeadersPolicyConfig", &config, ctx)
            .await?;
        let policy = ResponseHeadersPolicy::from(view);

        log::info!(
            "[{}] Created response headers policy {} ({})",
            self.provider_name(),
            policy.name,
            policy.id
        );
        Ok(policy)
    }

    async fn get_distribution(&self, domain: &str) -> Result<Option<Distribution>> {
        self.find_in_pages::<DistributionList, Distribution, _>(DISTRIBUTION, false, |d| {
            d.serves(domain)
        })
        .await
    }

    async fn create_distribution(&self, req: &CreateDistributionRequest) -> Result<Distribution> {
        self.check_alias(req)?;

        // 每次调用一个新的 CallerReference；传输层重试复用同一请求体
        let config = DistributionConfig::new(req, Uuid::new_v4().to_string());
        let ctx = ErrorContext::resource(req.domain.clone());

        let view: DistributionView = self
            .post(DISTRIBUTION, "DistributionConfig", &config, ctx)
            .await?;
        let distribution = Distribution::from(view);

        log::info!(
            "[{}] Created distribution {} for {} ({})",
            self.provider_name(),
            distribution.id,
            req.domain,
            distribution.domain_name
        );
        Ok(distribution)
    }
}
