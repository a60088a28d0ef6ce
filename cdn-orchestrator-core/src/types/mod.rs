//! 类型定义模块

mod report;
mod settings;
mod target;

pub use report::{DomainReport, Outcome, ReconcileReport, ResourceKind, ResourceOutcome};
pub use settings::{
    CacheSettings, CdnSettings, DEFAULT_CMS_DOMAIN, DEFAULT_LMS_DOMAIN, DEFAULT_REGION,
    ExtraDomain, ReconcilePlan,
};
pub use target::{OriginTarget, build_targets};

// Re-export provider 库的公共类型
pub use cdn_orchestrator_provider::{
    CachePolicy, CreateCachePolicyRequest, CreateDistributionRequest, Distribution,
    DistributionAlias, OriginRequestPolicy, ProviderCredentials, ResponseHeadersPolicy,
};
