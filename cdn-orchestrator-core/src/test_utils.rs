//! 测试辅助模块
//!
//! 提供内存中的 mock Provider 和便捷的测试工厂方法。

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use cdn_orchestrator_provider::{
    CachePolicy, CdnProvider, CreateCachePolicyRequest, CreateDistributionRequest, Distribution,
    OriginRequestPolicy, ProviderError, ResponseHeadersPolicy, Result, sanitize_name,
};
use tokio::sync::RwLock;

use crate::services::{ReconcileService, ServiceContext};

// ===== MockCdnProvider =====

/// 内存中的远端目录，行为与真实 Provider 一致：策略按规范化名称匹配，分发按源站域名匹配。
pub struct MockCdnProvider {
    cache_policies: RwLock<Vec<CachePolicy>>,
    origin_request_policies: RwLock<Vec<OriginRequestPolicy>>,
    response_headers_policies: RwLock<Vec<ResponseHeadersPolicy>>,
    distributions: RwLock<Vec<Distribution>>,
    distribution_requests: RwLock<Vec<CreateDistributionRequest>>,
    /// 按顺序记录的调用，格式为 `操作:参数`
    calls: RwLock<Vec<String>>,
    /// 如果 Some，与之相同的调用返回错误
    fail_on: RwLock<Option<String>>,
    next_id: AtomicUsize,
}

impl MockCdnProvider {
    pub fn new() -> Self {
        Self {
            cache_policies: RwLock::new(Vec::new()),
            origin_request_policies: RwLock::new(Vec::new()),
            response_headers_policies: RwLock::new(Vec::new()),
            distributions: RwLock::new(Vec::new()),
            distribution_requests: RwLock::new(Vec::new()),
            calls: RwLock::new(Vec::new()),
            fail_on: RwLock::new(None),
            next_id: AtomicUsize::new(1),
        }
    }

    pub async fn set_fail_on(&self, call: Option<String>) {
        *self.fail_on.write().await = call;
    }

    pub async fn seed_distribution(&self, distribution: Distribution) {
        self.distributions.write().await.push(distribution);
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    /// 以 `prefix` 开头的调用次数
    pub async fn count(&self, prefix: &str) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub async fn distribution_requests(&self) -> Vec<CreateDistributionRequest> {
        self.distribution_requests.read().await.clone()
    }

    pub async fn cache_policy(&self, name: &str) -> Option<CachePolicy> {
        let wanted = sanitize_name(name);
        self.cache_policies
            .read()
            .await
            .iter()
            .find(|p| p.name == wanted)
            .cloned()
    }

    async fn record(&self, op: &str, arg: &str) -> Result<()> {
        let call = format!("{op}:{arg}");
        self.calls.write().await.push(call.clone());

        if self.fail_on.read().await.as_deref() == Some(call.as_str()) {
            return Err(ProviderError::PermissionDenied {
                provider: "mock".to_string(),
                raw_message: Some(format!("injected failure on {call}")),
            });
        }
        Ok(())
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl CdnProvider for MockCdnProvider {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn get_cache_policy(&self, name: &str) -> Result<Option<CachePolicy>> {
        self.record("get_cache_policy", name).await?;
        Ok(self.cache_policy(name).await)
    }

    async fn create_cache_policy(&self, req: &CreateCachePolicyRequest) -> Result<CachePolicy> {
        self.record("create_cache_policy", &req.name).await?;
        let name = sanitize_name(&req.name);
        let policy = CachePolicy {
            id: self.next_id("cp"),
            comment: Some(format!("CloudFront cache policy for {name}.")),
            name,
            min_ttl: req.min_ttl,
            default_ttl: req.default_ttl,
            max_ttl: req.max_ttl,
            last_modified: None,
        };
        self.cache_policies.write().await.push(policy.clone());
        Ok(policy)
    }

    async fn get_origin_request_policy(&self, name: &str) -> Result<Option<OriginRequestPolicy>> {
        self.record("get_origin_request_policy", name).await?;
        let wanted = sanitize_name(name);
        Ok(self
            .origin_request_policies
            .read()
            .await
            .iter()
            .find(|p| p.name == wanted)
            .cloned())
    }

    async fn create_origin_request_policy(&self, name: &str) -> Result<OriginRequestPolicy> {
        self.record("create_origin_request_policy", name).await?;
        let policy = OriginRequestPolicy {
            id: self.next_id("orp"),
            name: sanitize_name(name),
            comment: None,
            last_modified: None,
        };
        self.origin_request_policies
            .write()
            .await
            .push(policy.clone());
        Ok(policy)
    }

    async fn get_response_headers_policy(
        &self,
        name: &str,
    ) -> Result<Option<ResponseHeadersPolicy>> {
        self.record("get_response_headers_policy", name).await?;
        let wanted = sanitize_name(name);
        Ok(self
            .response_headers_policies
            .read()
            .await
            .iter()
            .find(|p| p.name == wanted)
            .cloned())
    }

    async fn create_response_headers_policy(&self, name: &str) -> Result<ResponseHeadersPolicy> {
        self.record("create_response_headers_policy", name).await?;
        let policy = ResponseHeadersPolicy {
            id: self.next_id("rhp"),
            name: sanitize_name(name),
            comment: None,
            last_modified: None,
        };
        self.response_headers_policies
            .write()
            .await
            .push(policy.clone());
        Ok(policy)
    }

    async fn get_distribution(&self, domain: &str) -> Result<Option<Distribution>> {
        self.record("get_distribution", domain).await?;
        Ok(self
            .distributions
            .read()
            .await
            .iter()
            .find(|d| d.serves(domain))
            .cloned())
    }

    async fn create_distribution(&self, req: &CreateDistributionRequest) -> Result<Distribution> {
        self.record("create_distribution", &req.domain).await?;
        let id = self.next_id("E");
        let distribution = Distribution {
            arn: format!("arn:aws:cloudfront::000000000000:distribution/{id}"),
            status: "InProgress".to_string(),
            domain_name: format!("{}.cloudfront.net", id.to_lowercase()),
            enabled: true,
            origin_domains: vec![req.domain.clone()],
            aliases: req
                .alias
                .as_ref()
                .and_then(|a| a.domain.clone())
                .into_iter()
                .collect(),
            cache_policy_id: Some(req.cache_policy_id.clone()),
            origin_request_policy_id: Some(req.origin_request_policy_id.clone()),
            response_headers_policy_id: Some(req.response_headers_policy_id.clone()),
            id,
        };
        self.distributions.write().await.push(distribution.clone());
        self.distribution_requests.write().await.push(req.clone());
        Ok(distribution)
    }
}

// ===== 工厂方法 =====

/// 已部署、指向 `origin` 的分发，引用的策略与本次执行无关
pub fn existing_distribution(id: &str, origin: &str) -> Distribution {
    Distribution {
        id: id.to_string(),
        arn: format!("arn:aws:cloudfront::000000000000:distribution/{id}"),
        status: "Deployed".to_string(),
        domain_name: "d111111abcdef8.cloudfront.net".to_string(),
        enabled: true,
        origin_domains: vec![origin.to_string()],
        aliases: Vec::new(),
        cache_policy_id: Some("old-cp".to_string()),
        origin_request_policy_id: Some("old-orp".to_string()),
        response_headers_policy_id: None,
    }
}

pub fn create_test_reconcile_service() -> (ReconcileService, Arc<MockCdnProvider>) {
    let provider = Arc::new(MockCdnProvider::new());
    let ctx = Arc::new(ServiceContext::new(provider.clone()));
    (ReconcileService::new(ctx), provider)
}
