//! CloudFront HTTP 请求方法

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ProviderError, Result};
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::utils::datetime::amz_date;
use crate::utils::log_sanitizer::truncate_for_log;

use super::sign::canonical_query_string;
use super::types::ErrorResponse;
use super::{API_VERSION, CloudFrontProvider};

impl CloudFrontProvider {
    // ==================== 辅助方法 ====================

    /// 统一处理 CloudFront 响应错误
    fn handle_response_error(
        &self,
        status: u16,
        response_text: &str,
        ctx: ErrorContext,
    ) -> Result<()> {
        if (200..300).contains(&status) {
            return Ok(());
        }

        // 尝试解析 <ErrorResponse>
        if let Ok(error) = quick_xml::de::from_str::<ErrorResponse>(response_text) {
            let code = error.error.code.unwrap_or_default();
            let message = error.error.message.unwrap_or_default();
            log::debug!("[{}] API error {code}: {message}", self.provider_name());
            return Err(self.map_error(RawApiError::with_code(code, message), ctx));
        }

        // 回退到通用错误
        Err(self.unknown_error(RawApiError::new(format!(
            "HTTP {status}: {}",
            truncate_for_log(response_text)
        ))))
    }

    /// 构造需要签名的请求头
    fn signed_headers(&self, amz_date: &str, with_body: bool) -> Vec<(String, String)> {
        let mut headers = vec![
            ("Host".to_string(), self.endpoint.host.to_string()),
            ("X-Amz-Date".to_string(), amz_date.to_string()),
        ];
        if with_body {
            headers.push(("Content-Type".to_string(), "application/xml".to_string()));
        }
        if let Some(token) = &self.session_token {
            headers.push(("X-Amz-Security-Token".to_string(), token.clone()));
        }
        headers
    }

    fn url(&self, path: &str, query: &str) -> String {
        if query.is_empty() {
            format!("https://{}{path}", self.endpoint.host)
        } else {
            format!("https://{}{path}?{query}", self.endpoint.host)
        }
    }

    // ==================== 公开 API 方法 ====================

    /// 执行 GET 请求，`resource` 为 `/2020-05-31/` 之后的路径
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, &str)],
        ctx: ErrorContext,
    ) -> Result<T> {
        let path = format!("/{API_VERSION}/{resource}");
        let timestamp = amz_date(&Utc::now());
        let headers = self.signed_headers(&timestamp, false);
        let authorization = self.sign("GET", &path, query, &headers, "", &timestamp);

        let url = self.url(&path, &canonical_query_string(query));

        let mut request = self.client.get(&url);
        for (name, value) in &headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let request = request.header("Authorization", authorization);

        // 错误体在每次尝试内映射，400 Throttling 等也会被重试
        let (_, response_text) = HttpUtils::execute_request_with_retry(
            request,
            self.provider_name(),
            "GET",
            &url,
            self.max_retries,
            |status, body| self.handle_response_error(status, body, ctx.clone()),
        )
        .await?;

        HttpUtils::parse_xml(&response_text, self.provider_name())
    }

    /// 执行 POST 请求，`root` 为请求文档的根元素名
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        resource: &str,
        root: &str,
        body: &B,
        ctx: ErrorContext,
    ) -> Result<T> {
        let payload = quick_xml::se::to_string_with_root(root, body).map_err(|e| {
            ProviderError::SerializationError {
                provider: self.provider_name().to_string(),
                detail: e.to_string(),
            }
        })?;

        log::debug!("Request Body: {}", truncate_for_log(&payload));

        let path = format!("/{API_VERSION}/{resource}");
        let timestamp = amz_date(&Utc::now());
        let headers = self.signed_headers(&timestamp, true);
        let authorization = self.sign("POST", &path, &[], &headers, &payload, &timestamp);

        let url = self.url(&path, "");

        let mut request = self.client.post(&url);
        for (name, value) in &headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let request = request.header("Authorization", authorization).body(payload);

        let (_, response_text) = HttpUtils::execute_request_with_retry(
            request,
            self.provider_name(),
            "POST",
            &url,
            self.max_retries,
            |status, body| self.handle_response_error(status, body, ctx.clone()),
        )
        .await?;

        HttpUtils::parse_xml(&response_text, self.provider_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> CloudFrontProvider {
        CloudFrontProvider::new("ak".to_string(), "sk".to_string())
    }

    #[test]
    fn success_status_passes() {
        assert!(
            provider()
                .handle_response_error(201, "<CachePolicy/>", ErrorContext::default())
                .is_ok()
        );
    }

    #[test]
    fn error_response_is_mapped() {
        let body = r"<ErrorResponse><Error><Type>Sender</Type><Code>CachePolicyAlreadyExists</Code><Message>exists</Message></Error></ErrorResponse>";
        let err = provider()
            .handle_response_error(409, body, ErrorContext::resource("lms-example-com-cache-policy"))
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::ResourceExists { ref resource, .. } if resource == "lms-example-com-cache-policy"
        ));
    }

    #[test]
    fn unparseable_error_body_is_unknown() {
        let err = provider()
            .handle_response_error(500, "oops", ErrorContext::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Unknown { raw_code: None, ref raw_message, .. } if raw_message == "HTTP 500: oops"
        ));
    }

    #[test]
    fn session_token_is_sent_when_configured() {
        let p = CloudFrontProvider::builder("ak".to_string(), "sk".to_string())
            .session_token(Some("token".to_string()))
            .build();
        let headers = p.signed_headers("20240101T000000Z", true);
        let names: Vec<&str> = headers.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            names,
            vec!["Host", "X-Amz-Date", "Content-Type", "X-Amz-Security-Token"]
        );
    }

    #[test]
    fn url_includes_encoded_query() {
        let p = provider();
        assert_eq!(
            p.url("/2020-05-31/cache-policy", "Marker=a%2Fb&Type=custom"),
            "https://cloudfront.amazonaws.com/2020-05-31/cache-policy?Marker=a%2Fb&Type=custom"
        );
        assert_eq!(
            p.url("/2020-05-31/distribution", ""),
            "https://cloudfront.amazonaws.com/2020-05-31/distribution"
        );
    }

    // ---- retry against a local listener ----

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const THROTTLING: &str = "<ErrorResponse><Error><Type>Sender</Type><Code>Throttling</Code><Message>Rate exceeded</Message></Error></ErrorResponse>";
    const INTERNAL_ERROR: &str = "<ErrorResponse><Error><Type>Receiver</Type><Code>InternalError</Code><Message>try again</Message></Error></ErrorResponse>";
    const ACCESS_DENIED: &str = "<ErrorResponse><Error><Type>Sender</Type><Code>AccessDenied</Code><Message>no</Message></Error></ErrorResponse>";

    /// 依次返回 `replies`，最后一个重复使用；返回 URL 和连接计数
    async fn serve(replies: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let (status, body) = replies[n.min(replies.len() - 1)];
                let mut buf = [0_u8; 8192];
                let _ = socket.read(&mut buf).await;
                let reply = format!(
                    "HTTP/1.1 {status} Status\r\nContent-Type: text/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{addr}/2020-05-31/cache-policy"), hits)
    }

    async fn send(url: &str, max_retries: u32) -> Result<(u16, String)> {
        let p = provider();
        HttpUtils::execute_request_with_retry(
            reqwest::Client::new().get(url),
            "cloudfront",
            "GET",
            url,
            max_retries,
            |status, body| p.handle_response_error(status, body, ErrorContext::default()),
        )
        .await
    }

    #[tokio::test]
    async fn throttling_body_on_400_is_retried() {
        let (url, hits) = serve(vec![(400, THROTTLING)]).await;

        let err = send(&url, 2).await.unwrap_err();

        assert!(matches!(err, ProviderError::RateLimited { .. }), "{err:?}");
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn internal_error_body_is_retried_until_success() {
        let (url, hits) = serve(vec![(500, INTERNAL_ERROR), (200, "<CachePolicyList/>")]).await;

        let (status, body) = send(&url, 2).await.unwrap();

        assert_eq!(status, 200);
        assert_eq!(body, "<CachePolicyList/>");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn api_errors_are_not_retried() {
        let (url, hits) = serve(vec![(403, ACCESS_DENIED)]).await;

        let err = send(&url, 2).await.unwrap_err();

        assert!(matches!(err, ProviderError::PermissionDenied { .. }), "{err:?}");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_retries_still_maps_error_body() {
        let (url, hits) = serve(vec![(400, THROTTLING)]).await;

        let err = send(&url, 0).await.unwrap_err();

        assert!(matches!(err, ProviderError::RateLimited { .. }), "{err:?}");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
