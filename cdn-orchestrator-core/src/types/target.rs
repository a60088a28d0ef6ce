//! 需要接入 CDN 的源站列表

use cdn_orchestrator_provider::{DistributionAlias, sanitize_name};
use serde::Serialize;

use super::settings::ExtraDomain;

/// 一个源站域名及其分发的别名设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginTarget {
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<DistributionAlias>,
}

impl OriginTarget {
    pub fn new(domain: impl Into<String>, alias: Option<DistributionAlias>) -> Self {
        Self {
            domain: domain.into(),
            alias,
        }
    }

    pub fn origin_request_policy_name(&self) -> String {
        format!("{}-origin-request-policy", self.domain)
    }

    pub fn response_headers_policy_name(&self) -> String {
        format!("{}-response-headers-policy", self.domain)
    }

    pub fn cache_policy_name(&self) -> String {
        format!("{}-cache-policy", self.domain)
    }
}

/// 由 LMS、CMS 与额外域名构造有序的源站列表
///
/// 顺序为首次出现的顺序。重复的域名以最后一次的别名设置为准，并记录警告。
pub fn build_targets(lms: &str, cms: &str, extras: &[ExtraDomain]) -> Vec<OriginTarget> {
    let entries = [(lms, None), (cms, None)]
        .into_iter()
        .chain(
            extras
                .iter()
                .map(|e| (e.domain.as_str(), e.distribution_alias())),
        );

    let mut targets: Vec<OriginTarget> = Vec::new();
    for (domain, alias) in entries {
        let domain = domain.trim();
        if let Some(existing) = targets.iter_mut().find(|t| t.domain == domain) {
            log::warn!("Domain {domain} is configured more than once; the last entry wins");
            existing.alias = alias;
        } else {
            targets.push(OriginTarget::new(domain, alias));
        }
    }

    // 同名策略会在远端冲突
    for (i, a) in targets.iter().enumerate() {
        if let Some(b) = targets[i + 1..]
            .iter()
            .find(|b| sanitize_name(&b.domain) == sanitize_name(&a.domain))
        {
            log::warn!(
                "Domains {} and {} share policy names; their policies will be reused across both",
                a.domain,
                b.domain
            );
        }
    }

    targets
}
