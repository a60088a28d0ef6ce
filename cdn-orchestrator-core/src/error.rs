//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use cdn_orchestrator_provider::ProviderError;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Settings could not be read or parsed
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Settings parsed but are unusable (empty credentials, bad TTL order, ...)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Provider error (converting from library)
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl CoreError {
    /// Whether it is expected behavior (user input, resource does not exist, etc.) is used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added. **
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::ConfigError(_) | Self::ValidationError(_) => true,
            Self::Provider(e) => e.is_expected(),
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_errors_are_expected() {
        assert!(CoreError::ConfigError("bad toml".to_string()).is_expected());
        assert!(CoreError::ValidationError("empty key".to_string()).is_expected());
    }

    #[test]
    fn provider_errors_keep_their_classification() {
        let denied = CoreError::from(ProviderError::PermissionDenied {
            provider: "cloudfront".to_string(),
            raw_message: None,
        });
        assert!(denied.is_expected());

        let network = CoreError::from(ProviderError::NetworkError {
            provider: "cloudfront".to_string(),
            detail: "reset".to_string(),
        });
        assert!(!network.is_expected());
    }

    #[test]
    fn serializes_with_code_tag() {
        let json = serde_json::to_value(CoreError::ValidationError("x".to_string())).unwrap();
        assert_eq!(json["code"], "ValidationError");
        assert_eq!(json["details"], "x");
    }
}
