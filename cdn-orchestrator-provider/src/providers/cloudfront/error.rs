//! CloudFront 错误映射
//!
//! 参考: <https://docs.aws.amazon.com/cloudfront/latest/APIReference/CommonErrors.html>
//! 以及各 API（CreateCachePolicy / CreateDistribution 等）的 Errors 小节。
//!
//! ## 错误码分类
//!
//! - **认证错误**：`SignatureDoesNotMatch`, `InvalidClientTokenId`, `IncompleteSignature`,
//!   `MissingAuthenticationToken`, `ExpiredToken`, `InvalidSignatureException`
//! - **权限拒绝**：`AccessDenied`, `AccessDeniedException`, `NotAuthorizedException`
//! - **资源已存在**：`*AlreadyExists`, `CNAMEAlreadyExists`
//! - **资源不存在**：`NoSuch*`
//! - **配额超限**：`TooMany*`
//! - **频率限制**：`Throttling`, `ThrottlingException`, `RequestLimitExceeded`
//! - **参数错误**：`InvalidArgument`, `InvalidTTLOrder`, `InconsistentQuantities`,
//!   `InvalidViewerCertificate`, `IllegalUpdate` 等
//! - **服务端错误**：`ServiceUnavailable`, `InternalFailure`, `InternalError`
//!
//! ## 未映射（fallback 到 Unknown）
//!
//! - Lambda@Edge / CloudFront Functions / 字段级加密 / 实时日志相关错误：本项目不使用

use crate::error::ProviderError;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::CloudFrontProvider;

/// CloudFront 错误码映射实现
impl ProviderErrorMapper for CloudFrontProvider {
    fn provider_name(&self) -> &'static str {
        "cloudfront"
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        let provider = self.provider_name().to_string();

        match raw.code.as_deref() {
            // ============ 认证错误 ============
            Some(
                "SignatureDoesNotMatch"
                | "InvalidClientTokenId"
                | "IncompleteSignature"
                | "MissingAuthenticationToken"
                | "ExpiredToken"            // STS 临时凭证过期
                | "InvalidSignatureException"
                | "UnrecognizedClientException",
            ) => ProviderError::InvalidCredentials {
                provider,
                raw_message: Some(raw.message),
            },

            // ============ 权限拒绝 ============
            Some("AccessDenied" | "AccessDeniedException" | "NotAuthorizedException") => {
                ProviderError::PermissionDenied {
                    provider,
                    raw_message: Some(raw.message),
                }
            }

            // ============ 频率限制 ============
            Some("Throttling" | "ThrottlingException" | "RequestLimitExceeded") => {
                ProviderError::RateLimited {
                    provider,
                    retry_after: None,
                    raw_message: Some(raw.message),
                }
            }

            // ============ 资源已存在 ============
            // CachePolicyAlreadyExists / OriginRequestPolicyAlreadyExists /
            // ResponseHeadersPolicyAlreadyExists / DistributionAlreadyExists / CNAMEAlreadyExists
            Some(code) if code.ends_with("AlreadyExists") => ProviderError::ResourceExists {
                provider,
                resource: context.resource.unwrap_or_default(),
                raw_message: Some(raw.message),
            },

            // ============ 资源不存在 ============
            // NoSuchCachePolicy / NoSuchOriginRequestPolicy / NoSuchResponseHeadersPolicy /
            // NoSuchDistribution / NoSuchOrigin
            Some(code) if code.starts_with("NoSuch") => ProviderError::ResourceNotFound {
                provider,
                resource: context.resource.unwrap_or_default(),
                raw_message: Some(raw.message),
            },

            // ============ 配额超限 ============
            // TooManyCachePolicies / TooManyDistributions / TooManyHeadersInCachePolicy /
            // TooManyDistributionsAssociatedToCachePolicy ...
            Some(code) if code.starts_with("TooMany") => ProviderError::QuotaExceeded {
                provider,
                raw_message: Some(raw.message),
            },

            // ============ 参数无效 - TTL ============
            Some("InvalidTTLOrder") => ProviderError::InvalidParameter {
                provider,
                param: "ttl".to_string(),
                detail: raw.message,
            },

            // ============ 参数无效 - 证书 / 别名 ============
            Some(
                "InvalidViewerCertificate"
                | "InvalidMinimumProtocolVersion"
                | "InvalidProtocolSettings",  // SNI 与证书设置不匹配
            ) => ProviderError::InvalidParameter {
                provider,
                param: "viewer_certificate".to_string(),
                detail: raw.message,
            },

            // ============ 参数无效 - 源站 ============
            Some("InvalidOrigin" | "InvalidOriginReadTimeout" | "InvalidOriginKeepaliveTimeout") => {
                ProviderError::InvalidParameter {
                    provider,
                    param: "origin".to_string(),
                    detail: raw.message,
                }
            }

            // ============ 参数无效 - 通用 ============
            Some(
                "InvalidArgument"
                | "InconsistentQuantities"
                | "MalformedInput"
                | "MissingBody"
                | "IllegalUpdate"
                | "InvalidDefaultRootObject"
                | "InvalidRequiredProtocol"
                | "InvalidQueryStringParameters"
                | "InvalidHeadersForS3Origin"
                | "ValidationError",
            ) => ProviderError::InvalidParameter {
                provider,
                param: "request".to_string(),
                detail: raw.message,
            },

            // ============ 服务端错误 ============
            Some("ServiceUnavailable" | "InternalFailure" | "InternalError") => {
                ProviderError::NetworkError {
                    provider,
                    detail: raw.message,
                }
            }

            // ============ 其他错误 fallback ============
            _ => self.unknown_error(raw),
        }
    }
}
