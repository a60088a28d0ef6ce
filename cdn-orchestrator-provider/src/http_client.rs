//! Shared HTTP request handling
//!
//! Sending, logging, transient-error retry and XML decoding are common to every
//! management API call. Signing stays with the provider, which hands over a
//! fully configured `RequestBuilder`.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::ProviderError;
use crate::utils::log_sanitizer::truncate_for_log;

/// HTTP helper functions
pub struct HttpUtils;

impl HttpUtils {
    /// Sends a request once and returns the status code and body text.
    ///
    /// HTTP 429 becomes [`ProviderError::RateLimited`] and 502/503/504 become
    /// [`ProviderError::NetworkError`] so the retry loop can pick them up.
    /// Every other status is handed back to the caller for API error mapping.
    pub async fn execute_request(
        request_builder: RequestBuilder,
        provider_name: &str,
        method_name: &str,
        url: &str,
    ) -> Result<(u16, String), ProviderError> {
        log::debug!("[{provider_name}] {method_name} {url}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    provider: provider_name.to_string(),
                    detail: e.to_string(),
                }
            } else {
                ProviderError::NetworkError {
                    provider: provider_name.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status_code = response.status().as_u16();
        log::debug!("[{provider_name}] Response Status: {status_code}");

        // Retry-After must be read before the body consumes the response
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        if status_code == 429 {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{provider_name}] Rate limited (HTTP 429), retry_after={retry_after:?}");
            return Err(ProviderError::RateLimited {
                provider: provider_name.to_string(),
                retry_after,
                raw_message: Some(body),
            });
        }

        if matches!(status_code, 502..=504) {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{provider_name}] Server error (HTTP {status_code})");
            return Err(ProviderError::NetworkError {
                provider: provider_name.to_string(),
                detail: format!("HTTP {status_code}: {}", truncate_for_log(&body)),
            });
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| ProviderError::NetworkError {
                provider: provider_name.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!(
            "[{provider_name}] Response Body: {}",
            truncate_for_log(&response_text)
        );

        Ok((status_code, response_text))
    }

    /// One attempt: send, then let `check` turn an error body into a [`ProviderError`].
    async fn execute_checked<F>(
        request_builder: RequestBuilder,
        provider_name: &str,
        method_name: &str,
        url: &str,
        check: &F,
    ) -> Result<(u16, String), ProviderError>
    where
        F: Fn(u16, &str) -> Result<(), ProviderError>,
    {
        let (status, body) =
            Self::execute_request(request_builder, provider_name, method_name, url).await?;
        check(status, &body)?;
        Ok((status, body))
    }

    /// Decodes an XML response document.
    ///
    /// The root element name is not checked and unknown child elements are
    /// skipped, so response types only need to declare the fields they read.
    pub fn parse_xml<T>(response_text: &str, provider_name: &str) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        quick_xml::de::from_str(response_text).map_err(|e| {
            log::error!("[{provider_name}] XML parse failed: {e}");
            log::error!(
                "[{provider_name}] Raw response: {}",
                truncate_for_log(response_text)
            );
            ProviderError::ParseError {
                provider: provider_name.to_string(),
                detail: e.to_string(),
            }
        })
    }

    /// Sends a request and runs `check` on the status and body, retrying
    /// transient failures with exponential backoff.
    ///
    /// `check` maps API error bodies to [`ProviderError`] inside each attempt,
    /// so a throttling or service-unavailable document sent with a plain 400/500
    /// status is retried like a 429. `max_retries` of 0 sends exactly once.
    /// Only [`is_retryable`] errors are retried. A retried request is a clone
    /// of the original, so a create call resends the same body and the same
    /// `CallerReference`.
    pub async fn execute_request_with_retry<F>(
        request_builder: RequestBuilder,
        provider_name: &str,
        method_name: &str,
        url: &str,
        max_retries: u32,
        check: F,
    ) -> Result<(u16, String), ProviderError>
    where
        F: Fn(u16, &str) -> Result<(), ProviderError>,
    {
        if max_retries == 0 {
            return Self::execute_checked(request_builder, provider_name, method_name, url, &check)
                .await;
        }

        let mut last_error = None;

        for attempt in 0..=max_retries {
            let Some(req) = request_builder.try_clone() else {
                // streaming bodies cannot be cloned
                log::warn!("[{provider_name}] Cannot clone request, disabling retry");
                return Self::execute_checked(
                    request_builder,
                    provider_name,
                    method_name,
                    url,
                    &check,
                )
                .await;
            };

            match Self::execute_checked(req, provider_name, method_name, url, &check).await {
                Ok(resp) => return Ok(resp),
                Err(e) if attempt < max_retries && is_retryable(&e) => {
                    let delay = retry_delay(&e, attempt);
                    log::warn!(
                        "[{}] Request failed (attempt {}/{}), retrying in {:.1}s: {}",
                        provider_name,
                        attempt + 1,
                        max_retries,
                        delay.as_secs_f32(),
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ProviderError::NetworkError {
            provider: provider_name.to_string(),
            detail: "All retries exhausted with no error captured".to_string(),
        }))
    }
}

/// Transport failures and throttling are worth another attempt; API errors are not.
fn is_retryable(error: &ProviderError) -> bool {
    matches!(
        error,
        ProviderError::NetworkError { .. }
            | ProviderError::Timeout { .. }
            | ProviderError::RateLimited { .. }
    )
}

/// `Retry-After` wins when present (capped at 30s), otherwise exponential backoff.
fn retry_delay(error: &ProviderError, attempt: u32) -> Duration {
    if let ProviderError::RateLimited {
        retry_after: Some(secs),
        ..
    } = error
    {
        Duration::from_secs((*secs).min(30))
    } else {
        backoff_delay(attempt)
    }
}

/// 100ms, 200ms, 400ms, ... capped at 10 seconds.
fn backoff_delay(attempt: u32) -> Duration {
    let capped_attempt = attempt.min(20); // 防止 2^attempt 溢出
    let delay_ms = 100_u64.saturating_mul(1_u64 << capped_attempt);
    let delay_ms = delay_ms.min(10_000);
    Duration::from_millis(delay_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use std::time::Duration;

    // ---- is_retryable ----

    #[test]
    fn retryable_network_error() {
        let e = ProviderError::NetworkError {
            provider: "test".into(),
            detail: "err".into(),
        };
        assert!(is_retryable(&e));
    }

    #[test]
    fn retryable_timeout() {
        let e = ProviderError::Timeout {
            provider: "test".into(),
            detail: "err".into(),
        };
        assert!(is_retryable(&e));
    }

    #[test]
    fn retryable_rate_limited() {
        let e = ProviderError::RateLimited {
            provider: "test".into(),
            retry_after: None,
            raw_message: None,
        };
        assert!(is_retryable(&e));
    }

    #[test]
    fn not_retryable_auth_error() {
        let e = ProviderError::InvalidCredentials {
            provider: "test".into(),
            raw_message: None,
        };
        assert!(!is_retryable(&e));
    }

    #[test]
    fn not_retryable_resource_exists() {
        let e = ProviderError::ResourceExists {
            provider: "test".into(),
            resource: "lms-example-com-cache-policy".into(),
            raw_message: None,
        };
        assert!(!is_retryable(&e));
    }

    #[test]
    fn not_retryable_invalid_parameter() {
        let e = ProviderError::InvalidParameter {
            provider: "test".into(),
            param: "MinTTL".into(),
            detail: "err".into(),
        };
        assert!(!is_retryable(&e));
    }

    // ---- retry_delay ----

    #[test]
    fn retry_after_header_is_honored() {
        let e = ProviderError::RateLimited {
            provider: "test".into(),
            retry_after: Some(5),
            raw_message: None,
        };
        assert_eq!(retry_delay(&e, 0), Duration::from_secs(5));
    }

    #[test]
    fn retry_after_is_capped_at_30s() {
        let e = ProviderError::RateLimited {
            provider: "test".into(),
            retry_after: Some(600),
            raw_message: None,
        };
        assert_eq!(retry_delay(&e, 3), Duration::from_secs(30));
    }

    #[test]
    fn network_error_uses_backoff() {
        let e = ProviderError::NetworkError {
            provider: "test".into(),
            detail: "err".into(),
        };
        assert_eq!(retry_delay(&e, 2), Duration::from_millis(400));
    }

    // ---- backoff_delay ----

    #[test]
    fn backoff_doubles() {
        assert_eq!(backoff_delay(0), Duration::from_millis(100));
        assert_eq!(backoff_delay(1), Duration::from_millis(200));
        assert_eq!(backoff_delay(3), Duration::from_millis(800));
    }

    #[test]
    fn backoff_capped_at_10s() {
        // attempt 7: 100 * 2^7 = 12800ms, capped to 10000ms
        assert_eq!(backoff_delay(7), Duration::from_millis(10_000));
        assert_eq!(backoff_delay(u32::MAX), Duration::from_millis(10_000));
    }

    // ---- parse_xml ----

    #[test]
    fn parse_xml_valid_ignores_unknown_elements() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Foo {
            #[serde(rename = "Id")]
            id: String,
        }
        let result: Result<Foo, ProviderError> = HttpUtils::parse_xml(
            "<Foo><Id>abc</Id><Other>ignored</Other></Foo>",
            "test",
        );
        assert!(
            matches!(&result, Ok(Foo { id }) if id == "abc"),
            "unexpected parse result: {result:?}"
        );
    }

    #[test]
    fn parse_xml_invalid() {
        #[derive(serde::Deserialize, Debug)]
        #[allow(dead_code)]
        struct Foo {
            #[serde(rename = "Id")]
            id: String,
        }
        let result: Result<Foo, ProviderError> = HttpUtils::parse_xml("not xml", "test");
        assert!(
            matches!(&result, Err(ProviderError::ParseError { .. })),
            "unexpected parse result: {result:?}"
        );
    }
}
