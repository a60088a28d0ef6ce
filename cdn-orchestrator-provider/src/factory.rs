//! Provider factory functions.

use std::sync::Arc;

use crate::providers::CloudFrontProvider;
use crate::traits::CdnProvider;
use crate::types::ProviderCredentials;

/// Creates a [`CdnProvider`] instance from the given credentials.
///
/// The concrete provider type is determined by the [`ProviderCredentials`] variant.
/// The returned provider is wrapped in `Arc<dyn CdnProvider>` for easy sharing.
///
/// # Examples
///
/// ```rust,no_run
/// use cdn_orchestrator_provider::{create_provider, ProviderCredentials};
///
/// let provider = create_provider(ProviderCredentials::CloudFront {
///     access_key_id: "your-access-key-id".to_string(),
///     secret_access_key: "your-secret-access-key".to_string(),
///     session_token: None,
///     region: "us-east-1".to_string(),
/// });
/// assert_eq!(provider.id(), "cloudfront");
/// ```
pub fn create_provider(credentials: ProviderCredentials) -> Arc<dyn CdnProvider> {
    match credentials {
        ProviderCredentials::CloudFront {
            access_key_id,
            secret_access_key,
            session_token,
            region,
        } => Arc::new(
            CloudFrontProvider::builder(access_key_id, secret_access_key)
                .session_token(session_token)
                .region(region)
                .build(),
        ),
    }
}
