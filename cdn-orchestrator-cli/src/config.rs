//! Settings loading: TOML file first, then the process environment.

use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use cdn_orchestrator_core::CdnSettings;

/// Load settings from `path` and overlay the process environment.
pub fn load_settings(path: &Path) -> Result<CdnSettings> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load_settings`] with an explicit environment lookup.
pub fn load_settings_with<F>(path: &Path, lookup: F) -> Result<CdnSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = match std::fs::read_to_string(path) {
        Ok(content) => CdnSettings::from_toml_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(
                "No settings file at {}, using defaults and environment",
                path.display()
            );
            CdnSettings::default()
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    settings.apply_env(lookup);
    tracing::debug!("Loaded settings: {settings:?}");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
CLOUDFRONT_AWS_ACCESS_KEY_ID = "AKIDEXAMPLE"
CLOUDFRONT_AWS_SECRET_ACCESS_KEY = "secret"
CLOUDFRONT_LMS_DOMAIN = "lms.example.com"
CLOUDFRONT_CMS_DOMAIN = "studio.example.com"
"#,
        )
        .unwrap();

        let settings = load_settings_with(&path, no_env).unwrap();
        let plan = settings.validate().unwrap();
        assert_eq!(plan.targets.len(), 2);
        assert_eq!(settings.aws_region, "us-east-1");
    }

    #[test]
    fn missing_file_uses_defaults_and_environment() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.toml");

        let settings = load_settings_with(&path, |key| match key {
            "CLOUDFRONT_LMS_DOMAIN" => Some("lms.x".to_string()),
            "AWS_ACCESS_KEY_ID" => Some("AKIDEXAMPLE".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(settings.lms_domain, "lms.x");
        assert_eq!(settings.cms_domain, "{{ CMS_HOST }}");
        assert_eq!(settings.aws_access_key_id, "AKIDEXAMPLE");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "CLOUDFRONT_EXTRA_DOMAINS = \"apps.x\"").unwrap();

        let err = load_settings_with(&path, no_env).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn directory_is_a_read_error() {
        let temp_dir = TempDir::new().unwrap();

        let err = load_settings_with(temp_dir.path(), no_env).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
