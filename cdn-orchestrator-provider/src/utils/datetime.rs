//! 时间戳工具
//!
//! - SigV4 所需的 `YYYYMMDD'T'HHMMSS'Z'` 格式化（credential scope 取其前 8 位）
//! - CloudFront `LastModifiedTime`（ISO 8601）反序列化为 `DateTime<Utc>`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// `X-Amz-Date` 格式
pub fn amz_date(now: &DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H%M%SZ").to_string()
}

/// 反序列化可选的 RFC3339 时间；无法解析时返回 `None` 而不是报错
///
/// 时间只用于展示，不应该因为格式差异让整个列表解析失败。
pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_rfc3339))
}

/// 解析 RFC3339 字符串
pub fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_for_signing() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(amz_date(&now), "20240102T030405Z");
    }

    #[test]
    fn parses_cloudfront_timestamp() {
        let dt = parse_rfc3339("2024-05-01T12:30:00.123Z").unwrap();
        assert_eq!(dt.timestamp(), 1_714_566_600);
    }

    #[test]
    fn invalid_timestamp_is_none() {
        assert!(parse_rfc3339("yesterday").is_none());
    }
}
