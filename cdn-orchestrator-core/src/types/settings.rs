//! CloudFront 设置
//!
//! 配置文件沿用宿主配置的键名（`CLOUDFRONT_*`），同时接受去掉前缀的写法。
//! 环境变量优先于配置文件；访问密钥仍为空时回退到标准的 `AWS_*` 变量。

use cdn_orchestrator_provider::{DistributionAlias, ProviderCredentials};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

use super::target::{OriginTarget, build_targets};

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_LMS_DOMAIN: &str = "{{ LMS_HOST }}";
pub const DEFAULT_CMS_DOMAIN: &str = "{{ CMS_HOST }}";

/// 可被环境变量覆盖的标量键
const ENV_REGION: &str = "CLOUDFRONT_AWS_REGION";
const ENV_ACCESS_KEY_ID: &str = "CLOUDFRONT_AWS_ACCESS_KEY_ID";
const ENV_SECRET_ACCESS_KEY: &str = "CLOUDFRONT_AWS_SECRET_ACCESS_KEY";
const ENV_SESSION_TOKEN: &str = "CLOUDFRONT_AWS_SESSION_TOKEN";
const ENV_LMS_DOMAIN: &str = "CLOUDFRONT_LMS_DOMAIN";
const ENV_CMS_DOMAIN: &str = "CLOUDFRONT_CMS_DOMAIN";

/// 标准 AWS 凭证变量
const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";

/// 缓存策略的 TTL（秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub min_ttl: u64,
    pub default_ttl: u64,
    pub max_ttl: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            min_ttl: 0,
            default_ttl: 300,
            max_ttl: 3600,
        }
    }
}

impl CacheSettings {
    /// `min <= default <= max`
    fn validate(&self) -> CoreResult<()> {
        if self.min_ttl <= self.default_ttl && self.default_ttl <= self.max_ttl {
            return Ok(());
        }
        Err(CoreError::ValidationError(format!(
            "CLOUDFRONT_CACHE_CONFIG requires min_ttl <= default_ttl <= max_ttl, got {}/{}/{}",
            self.min_ttl, self.default_ttl, self.max_ttl
        )))
    }
}

/// 额外的源站域名，可选绑定别名与 ACM 证书
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraDomain {
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_arn: Option<String>,
}

impl ExtraDomain {
    fn alias_domain(&self) -> Option<&str> {
        self.alias.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    fn certificate(&self) -> Option<&str> {
        self.certificate_arn
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// 别名与证书都未设置时返回 `None`
    pub fn distribution_alias(&self) -> Option<DistributionAlias> {
        match (self.alias_domain(), self.certificate()) {
            (None, None) => None,
            (domain, arn) => Some(DistributionAlias {
                domain: domain.map(str::to_string),
                certificate_arn: arn.map(str::to_string),
            }),
        }
    }

    fn validate(&self, index: usize) -> CoreResult<()> {
        check_domain(&format!("CLOUDFRONT_EXTRA_DOMAINS[{index}].domain"), &self.domain)?;

        match (self.alias_domain(), self.certificate()) {
            (Some(alias), None) => Err(CoreError::ValidationError(format!(
                "extra domain {} has alias {alias} but no certificate_arn",
                self.domain
            ))),
            (None, Some(_)) => Err(CoreError::ValidationError(format!(
                "extra domain {} has a certificate_arn but no alias",
                self.domain
            ))),
            (Some(alias), Some(_)) => check_domain(
                &format!("CLOUDFRONT_EXTRA_DOMAINS[{index}].alias"),
                alias,
            ),
            (None, None) => Ok(()),
        }
    }
}

/// 完整的 CloudFront 设置
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CdnSettings {
    #[serde(rename = "CLOUDFRONT_AWS_REGION", alias = "AWS_REGION")]
    pub aws_region: String,

    #[serde(rename = "CLOUDFRONT_AWS_ACCESS_KEY_ID", alias = "AWS_ACCESS_KEY_ID")]
    pub aws_access_key_id: String,

    #[serde(
        rename = "CLOUDFRONT_AWS_SECRET_ACCESS_KEY",
        alias = "AWS_SECRET_ACCESS_KEY"
    )]
    pub aws_secret_access_key: String,

    #[serde(
        rename = "CLOUDFRONT_AWS_SESSION_TOKEN",
        alias = "AWS_SESSION_TOKEN",
        skip_serializing_if = "Option::is_none"
    )]
    pub aws_session_token: Option<String>,

    #[serde(rename = "CLOUDFRONT_LMS_DOMAIN", alias = "LMS_DOMAIN")]
    pub lms_domain: String,

    #[serde(rename = "CLOUDFRONT_CMS_DOMAIN", alias = "CMS_DOMAIN")]
    pub cms_domain: String,

    #[serde(rename = "CLOUDFRONT_CACHE_CONFIG", alias = "CACHE_CONFIG")]
    pub cache_config: CacheSettings,

    #[serde(rename = "CLOUDFRONT_EXTRA_DOMAINS", alias = "EXTRA_DOMAINS")]
    pub extra_domains: Vec<ExtraDomain>,
}

impl Default for CdnSettings {
    fn default() -> Self {
        Self {
            aws_region: DEFAULT_REGION.to_string(),
            aws_access_key_id: String::new(),
            aws_secret_access_key: String::new(),
            aws_session_token: None,
            lms_domain: DEFAULT_LMS_DOMAIN.to_string(),
            cms_domain: DEFAULT_CMS_DOMAIN.to_string(),
            cache_config: CacheSettings::default(),
            extra_domains: Vec::new(),
        }
    }
}

// 不要在日志里打印密钥
impl std::fmt::Debug for CdnSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdnSettings")
            .field("aws_region", &self.aws_region)
            .field("aws_access_key_id", &self.aws_access_key_id)
            .field("aws_secret_access_key", &"***")
            .field(
                "aws_session_token",
                &self.aws_session_token.as_ref().map(|_| "***"),
            )
            .field("lms_domain", &self.lms_domain)
            .field("cms_domain", &self.cms_domain)
            .field("cache_config", &self.cache_config)
            .field("extra_domains", &self.extra_domains)
            .finish()
    }
}

/// 校验通过后的执行计划
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// 按首次出现顺序排列的源站
    pub targets: Vec<OriginTarget>,
    pub cache: CacheSettings,
}

impl CdnSettings {
    /// 解析 TOML 配置内容
    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        toml::from_str(content).map_err(|e| CoreError::ConfigError(e.to_string()))
    }

    /// 用环境变量覆盖配置文件中的值
    ///
    /// `lookup` 通常是 `|k| std::env::var(k).ok()`，测试中可以传入固定表。
    /// 空值视为未设置。
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get(ENV_REGION) {
            self.aws_region = v;
        }
        if let Some(v) = get(ENV_ACCESS_KEY_ID) {
            self.aws_access_key_id = v;
        }
        if let Some(v) = get(ENV_SECRET_ACCESS_KEY) {
            self.aws_secret_access_key = v;
        }
        if let Some(v) = get(ENV_SESSION_TOKEN) {
            self.aws_session_token = Some(v);
        }
        if let Some(v) = get(ENV_LMS_DOMAIN) {
            self.lms_domain = v;
        }
        if let Some(v) = get(ENV_CMS_DOMAIN) {
            self.cms_domain = v;
        }

        // 回退到标准 AWS 变量；会话令牌只跟随同一来源的访问密钥
        if self.aws_access_key_id.is_empty()
            && let Some(v) = get(AWS_ACCESS_KEY_ID)
        {
            log::debug!("Using {AWS_ACCESS_KEY_ID} from the environment");
            self.aws_access_key_id = v;
            if self.aws_session_token.is_none() {
                self.aws_session_token = get(AWS_SESSION_TOKEN);
            }
        }
        if self.aws_secret_access_key.is_empty()
            && let Some(v) = get(AWS_SECRET_ACCESS_KEY)
        {
            log::debug!("Using {AWS_SECRET_ACCESS_KEY} from the environment");
            self.aws_secret_access_key = v;
        }
    }

    /// 在发起任何网络请求之前校验设置，并生成执行计划
    pub fn validate(&self) -> CoreResult<ReconcilePlan> {
        if self.aws_access_key_id.is_empty() {
            return Err(CoreError::ValidationError(format!(
                "{ENV_ACCESS_KEY_ID} is empty (set it in the config file, \
                 {ENV_ACCESS_KEY_ID} or {AWS_ACCESS_KEY_ID})"
            )));
        }
        if self.aws_secret_access_key.is_empty() {
            return Err(CoreError::ValidationError(format!(
                "{ENV_SECRET_ACCESS_KEY} is empty (set it in the config file, \
                 {ENV_SECRET_ACCESS_KEY} or {AWS_SECRET_ACCESS_KEY})"
            )));
        }

        check_domain(ENV_LMS_DOMAIN, &self.lms_domain)?;
        check_domain(ENV_CMS_DOMAIN, &self.cms_domain)?;
        for (index, extra) in self.extra_domains.iter().enumerate() {
            extra.validate(index)?;
        }
        self.cache_config.validate()?;

        Ok(ReconcilePlan {
            targets: build_targets(&self.lms_domain, &self.cms_domain, &self.extra_domains),
            cache: self.cache_config,
        })
    }

    /// 构造 Provider 凭证
    pub fn provider_credentials(&self) -> ProviderCredentials {
        let region = if self.aws_region.is_empty() {
            DEFAULT_REGION.to_string()
        } else {
            self.aws_region.clone()
        };

        ProviderCredentials::CloudFront {
            access_key_id: self.aws_access_key_id.clone(),
            secret_access_key: self.aws_secret_access_key.clone(),
            session_token: self.aws_session_token.clone().filter(|t| !t.is_empty()),
            region,
        }
    }
}

/// 域名不能为空，也不能是未渲染的模板
fn check_domain(key: &str, value: &str) -> CoreResult<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CoreError::ValidationError(format!("{key} is empty")));
    }
    if value.contains("{{") || value.contains("}}") {
        return Err(CoreError::ValidationError(format!(
            "{key} is an unrendered template: {value}"
        )));
    }
    if value.contains(char::is_whitespace) {
        return Err(CoreError::ValidationError(format!(
            "{key} contains whitespace: {value}"
        )));
    }
    Ok(())
}
