//! 业务逻辑服务层

mod reconcile_service;

pub use reconcile_service::ReconcileService;

use std::sync::Arc;

use cdn_orchestrator_provider::CdnProvider;

/// 服务上下文 - 持有所有依赖
///
/// 平台层创建 Provider 后注入此上下文；测试中注入 mock。
pub struct ServiceContext {
    /// CDN Provider
    pub provider: Arc<dyn CdnProvider>,
}

impl ServiceContext {
    /// 创建服务上下文
    #[must_use]
    pub fn new(provider: Arc<dyn CdnProvider>) -> Self {
        Self { provider }
    }

    /// 获取 Provider 实例
    #[must_use]
    pub fn provider(&self) -> Arc<dyn CdnProvider> {
        Arc::clone(&self.provider)
    }
}
