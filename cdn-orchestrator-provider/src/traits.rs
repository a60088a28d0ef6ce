use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::types::{
    CachePolicy, CreateCachePolicyRequest, CreateDistributionRequest, Distribution,
    OriginRequestPolicy, ResponseHeadersPolicy,
};

/// 原始 API 错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// 错误码（CloudFront: `ErrorResponse/Error/Code`）
    pub code: Option<String>,
    /// 原始错误消息
    pub message: String,
}

impl RawApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// 错误上下文信息（内部使用）
/// 用于在映射错误时提供额外信息
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// 资源名称或 ID（用于 `ResourceExists` / `ResourceNotFound`）
    pub resource: Option<String>,
}

impl ErrorContext {
    pub fn resource(resource: impl Into<String>) -> Self {
        Self {
            resource: Some(resource.into()),
        }
    }
}

/// Provider 错误映射 Trait（内部使用）
/// 将原始 API 错误映射到统一错误类型
pub(crate) trait ProviderErrorMapper {
    /// 返回 Provider 标识符
    fn provider_name(&self) -> &'static str;

    /// 将原始 API 错误映射到统一错误类型
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError;

    /// 快捷方法：未知错误（fallback）
    fn unknown_error(&self, raw: RawApiError) -> ProviderError {
        ProviderError::Unknown {
            provider: self.provider_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// CDN 提供商 Trait
///
/// Each resource kind comes as a (lookup, create) pair. Lookups return
/// `Ok(None)` when nothing matches; creates never check for existence first.
/// Names passed in are raw domain-derived names; implementations sanitize
/// them with [`sanitize_name`](crate::sanitize_name) before use.
#[async_trait]
pub trait CdnProvider: Send + Sync {
    /// 提供商标识符
    fn id(&self) -> &'static str;

    /// Find a custom cache policy whose name equals the sanitized `name`.
    async fn get_cache_policy(&self, name: &str) -> Result<Option<CachePolicy>>;

    /// Create a cache policy with the fixed forwarding rules and the given TTLs.
    async fn create_cache_policy(&self, req: &CreateCachePolicyRequest) -> Result<CachePolicy>;

    /// Find a custom origin-request policy whose name equals the sanitized `name`.
    async fn get_origin_request_policy(&self, name: &str) -> Result<Option<OriginRequestPolicy>>;

    /// Create an origin-request policy forwarding `Origin` and all query strings.
    async fn create_origin_request_policy(&self, name: &str) -> Result<OriginRequestPolicy>;

    /// Find a custom response-headers policy whose name equals the sanitized `name`.
    async fn get_response_headers_policy(
        &self,
        name: &str,
    ) -> Result<Option<ResponseHeadersPolicy>>;

    /// Create a response-headers policy with permissive CORS.
    async fn create_response_headers_policy(&self, name: &str) -> Result<ResponseHeadersPolicy>;

    /// Find the distribution serving `domain` (origin domain or CloudFront hostname).
    async fn get_distribution(&self, domain: &str) -> Result<Option<Distribution>>;

    /// Create a distribution for `req.domain` bound to the three policy IDs.
    async fn create_distribution(&self, req: &CreateDistributionRequest) -> Result<Distribution>;
}
