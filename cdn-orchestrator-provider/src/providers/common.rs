//! Provider 公共工具函数

use std::time::Duration;

use hmac::{Hmac, Mac};
use reqwest::Client;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

// ============ HTTP Client ============

/// 默认连接超时（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 创建带超时配置的 HTTP Client
///
/// TLS 后端初始化失败时退回默认 `Client`（无超时），并记录错误。
pub fn create_http_client() -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|e| {
            log::error!("Failed to build HTTP client with timeouts, using defaults: {e}");
            Client::new()
        })
}

// ============ Hashing ============

/// HMAC-SHA256 计算
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    // HMAC 接受任意长度的 key，new_from_slice 不会失败
    let Ok(mut mac) = HmacSha256::new_from_slice(key) else {
        unreachable!("HMAC can take key of any size")
    };
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// SHA-256 hex digest
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

// ============ 名称处理 ============

/// Normalizes a resource name the way CloudFront policy names are stored:
/// lowercase, with `.` and spaces replaced by `-`.
///
/// Idempotent: `sanitize_name(&sanitize_name(x)) == sanitize_name(x)`.
///
/// ```
/// use cdn_orchestrator_provider::sanitize_name;
///
/// assert_eq!(sanitize_name("LMS.Example.com cache"), "lms-example-com-cache");
/// ```
pub fn sanitize_name(name: &str) -> String {
    name.to_lowercase().replace(['.', ' '], "-")
}
