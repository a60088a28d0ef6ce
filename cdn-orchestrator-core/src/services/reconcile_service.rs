//! CloudFront 资源协调服务
//!
//! 对每个源站依次执行：源站请求策略、响应头策略、缓存策略、分发。
//! 每个资源都是先按名称（分发按域名）查找，找不到再创建。
//! 任何一步失败都会中止整个执行，已创建的资源不回滚。

use std::sync::Arc;

use cdn_orchestrator_provider::{CreateCachePolicyRequest, CreateDistributionRequest, Distribution};

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::types::{
    CacheSettings, DomainReport, OriginTarget, Outcome, ReconcilePlan, ReconcileReport,
    ResourceKind, ResourceOutcome,
};

/// CloudFront 资源协调服务
pub struct ReconcileService {
    ctx: Arc<ServiceContext>,
}

impl ReconcileService {
    /// 创建协调服务实例
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// 按顺序处理计划中的所有源站
    pub async fn reconcile(&self, plan: &ReconcilePlan) -> CoreResult<ReconcileReport> {
        let mut report = ReconcileReport::default();

        for target in &plan.targets {
            let domain_report = self
                .reconcile_target(target, &plan.cache)
                .await
                .inspect_err(|e| log_failure(&target.domain, e))?;
            report.domains.push(domain_report);
        }

        log::info!(
            "Reconciled {} domain(s): {} resource(s) created, {} reused",
            report.domains.len(),
            report.created_count(),
            report.reused_count()
        );
        Ok(report)
    }

    /// 处理单个源站
    pub async fn reconcile_target(
        &self,
        target: &OriginTarget,
        cache: &CacheSettings,
    ) -> CoreResult<DomainReport> {
        log::info!("Reconciling CloudFront resources for {}", target.domain);

        let origin_request = self
            .ensure_origin_request_policy(&target.origin_request_policy_name())
            .await?;
        let response_headers = self
            .ensure_response_headers_policy(&target.response_headers_policy_name())
            .await?;
        let cache_policy = self
            .ensure_cache_policy(&target.cache_policy_name(), cache)
            .await?;

        let distribution = self
            .ensure_distribution(&CreateDistributionRequest {
                domain: target.domain.clone(),
                cache_policy_id: cache_policy.id.clone(),
                origin_request_policy_id: origin_request.id.clone(),
                response_headers_policy_id: response_headers.id.clone(),
                alias: target.alias.clone(),
            })
            .await?;

        Ok(DomainReport {
            domain: target.domain.clone(),
            resources: vec![origin_request, response_headers, cache_policy, distribution],
        })
    }

    /// 查找或创建源站请求策略
    pub async fn ensure_origin_request_policy(&self, name: &str) -> CoreResult<ResourceOutcome> {
        let provider = self.ctx.provider();
        let kind = ResourceKind::OriginRequestPolicy;

        if let Some(policy) = provider.get_origin_request_policy(name).await? {
            return Ok(reused(kind, policy.name, policy.id));
        }
        let policy = provider.create_origin_request_policy(name).await?;
        Ok(created(kind, policy.name, policy.id))
    }

    /// 查找或创建响应头策略
    pub async fn ensure_response_headers_policy(
        &self,
        name: &str,
    ) -> CoreResult<ResourceOutcome> {
        let provider = self.ctx.provider();
        let kind = ResourceKind::ResponseHeadersPolicy;

        if let Some(policy) = provider.get_response_headers_policy(name).await? {
            return Ok(reused(kind, policy.name, policy.id));
        }
        let policy = provider.create_response_headers_policy(name).await?;
        Ok(created(kind, policy.name, policy.id))
    }

    /// 查找或创建缓存策略
    ///
    /// 已存在的策略不会按新的 TTL 更新。
    pub async fn ensure_cache_policy(
        &self,
        name: &str,
        cache: &CacheSettings,
    ) -> CoreResult<ResourceOutcome> {
        let provider = self.ctx.provider();
        let kind = ResourceKind::CachePolicy;

        if let Some(policy) = provider.get_cache_policy(name).await? {
            if (policy.min_ttl, policy.default_ttl, policy.max_ttl)
                != (cache.min_ttl, cache.default_ttl, cache.max_ttl)
            {
                log::warn!(
                    "Cache policy {} has TTLs {}/{}/{}, configured {}/{}/{}; existing policies are not updated",
                    policy.name,
                    policy.min_ttl,
                    policy.default_ttl,
                    policy.max_ttl,
                    cache.min_ttl,
                    cache.default_ttl,
                    cache.max_ttl
                );
            }
            return Ok(reused(kind, policy.name, policy.id));
        }

        let policy = provider
            .create_cache_policy(&CreateCachePolicyRequest {
                name: name.to_string(),
                min_ttl: cache.min_ttl,
                default_ttl: cache.default_ttl,
                max_ttl: cache.max_ttl,
            })
            .await?;
        Ok(created(kind, policy.name, policy.id))
    }

    /// 查找或创建分发
    ///
    /// 已存在的分发直接复用，即使它引用的策略与本次不同。
    pub async fn ensure_distribution(
        &self,
        req: &CreateDistributionRequest,
    ) -> CoreResult<ResourceOutcome> {
        let provider = self.ctx.provider();
        let kind = ResourceKind::Distribution;

        if let Some(existing) = provider.get_distribution(&req.domain).await? {
            warn_if_stale(&existing, req);
            return Ok(reused(kind, req.domain.clone(), existing.id));
        }
        let distribution = provider.create_distribution(req).await?;
        Ok(created(kind, req.domain.clone(), distribution.id))
    }
}

fn reused(kind: ResourceKind, name: String, id: String) -> ResourceOutcome {
    log::debug!("Reusing {kind} {name} ({id})");
    ResourceOutcome {
        kind,
        name,
        id,
        outcome: Outcome::Reused,
    }
}

fn created(kind: ResourceKind, name: String, id: String) -> ResourceOutcome {
    ResourceOutcome {
        kind,
        name,
        id,
        outcome: Outcome::Created,
    }
}

fn warn_if_stale(existing: &Distribution, req: &CreateDistributionRequest) {
    let references = [
        (
            ResourceKind::OriginRequestPolicy,
            existing.origin_request_policy_id.as_deref(),
            req.origin_request_policy_id.as_str(),
        ),
        (
            ResourceKind::ResponseHeadersPolicy,
            existing.response_headers_policy_id.as_deref(),
            req.response_headers_policy_id.as_str(),
        ),
        (
            ResourceKind::CachePolicy,
            existing.cache_policy_id.as_deref(),
            req.cache_policy_id.as_str(),
        ),
    ];

    for (kind, actual, wanted) in references {
        if actual != Some(wanted) {
            log::warn!(
                "Distribution {} for {} uses {kind} {} instead of {wanted}; existing distributions are not updated",
                existing.id,
                req.domain,
                actual.unwrap_or("(none)")
            );
        }
    }
}

fn log_failure(domain: &str, e: &CoreError) {
    if e.is_expected() {
        log::warn!("CloudFront reconciliation failed for {domain}: {e}");
    } else {
        log::error!("CloudFront reconciliation failed for {domain}: {e}");
    }
}
