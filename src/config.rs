//! Client configuration
//!
//! [`ClientConfig`] holds the connection settings shared by the S3 and
//! Redshift clients: region, optional static credentials, an optional
//! named profile, and an endpoint override for S3-compatible stores
//! (MinIO, LocalStack).

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::config::Credentials;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fallback region when none is configured anywhere
pub const DEFAULT_REGION: &str = "us-east-1";

/// Connection settings for the AWS clients
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Custom endpoint URL (MinIO, LocalStack). `None` uses the real AWS endpoints.
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Use path-style addressing. Required by most S3-compatible stores.
    #[serde(default)]
    pub force_path_style: bool,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub access_key_id: Option<String>,

    #[serde(default)]
    pub secret_access_key: Option<String>,

    /// Named profile from ~/.aws/config. Ignored when static credentials are set.
    #[serde(default)]
    pub profile: Option<String>,
}

impl ClientConfig {
    /// Build a configuration from environment variables.
    ///
    /// Reads `access_key` / `secret_access_key` / `region_name`, falling back
    /// to the standard `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` /
    /// `AWS_REGION` names. Returns [`Error::MissingCredentials`] when no key
    /// pair is present; the region defaults to [`DEFAULT_REGION`].
    pub fn from_env() -> Result<Self> {
        let access_key_id = env_var("access_key").or_else(|| env_var("AWS_ACCESS_KEY_ID"));
        let secret_access_key =
            env_var("secret_access_key").or_else(|| env_var("AWS_SECRET_ACCESS_KEY"));

        if access_key_id.is_none() || secret_access_key.is_none() {
            return Err(Error::MissingCredentials);
        }

        let region = env_var("region_name")
            .or_else(|| env_var("AWS_REGION"))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        Ok(Self {
            region: Some(region),
            access_key_id,
            secret_access_key,
            ..Self::default()
        })
    }

    /// Resolve into an [`SdkConfig`] usable by any service client.
    pub async fn resolve(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }

        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }

        if let (Some(key), Some(secret)) = (&self.access_key_id, &self.secret_access_key) {
            loader =
                loader.credentials_provider(Credentials::new(key, secret, None, None, "datalift"));
        }

        if let Some(endpoint) = &self.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        loader.load().await
    }

    /// The configured region, or the default
    pub fn region_or_default(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var tests mutate process state; serialize them and clear every
    // variable they touch first.
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    fn clear_env() {
        for name in [
            "access_key",
            "secret_access_key",
            "region_name",
            "AWS_ACCESS_KEY_ID",
            "AWS_SECRET_ACCESS_KEY",
            "AWS_REGION",
        ] {
            std::env::remove_var(name);
        }
    }

    #[test]
    fn test_from_env_missing_credentials() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        let result = ClientConfig::from_env();
        assert!(matches!(result, Err(Error::MissingCredentials)));
    }

    #[test]
    fn test_from_env_with_credentials() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var("access_key", "AKIATEST");
        std::env::set_var("secret_access_key", "secret");
        std::env::set_var("region_name", "eu-west-1");

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.access_key_id.as_deref(), Some("AKIATEST"));
        assert_eq!(config.secret_access_key.as_deref(), Some("secret"));
        assert_eq!(config.region.as_deref(), Some("eu-west-1"));

        clear_env();
    }

    #[test]
    fn test_from_env_region_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var("access_key", "AKIATEST");
        std::env::set_var("secret_access_key", "secret");

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.region.as_deref(), Some(DEFAULT_REGION));

        clear_env();
    }

    #[test]
    fn test_region_or_default() {
        let config = ClientConfig::default();
        assert_eq!(config.region_or_default(), "us-east-1");

        let config = ClientConfig {
            region: Some("ap-southeast-2".to_string()),
            ..Default::default()
        };
        assert_eq!(config.region_or_default(), "ap-southeast-2");
    }

    #[test]
    fn test_serde_round_trip() {
        let config = ClientConfig {
            endpoint_url: Some("http://localhost:9000".to_string()),
            force_path_style: true,
            region: Some("us-east-1".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: ClientConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.endpoint_url, config.endpoint_url);
        assert!(parsed.force_path_style);
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert!(config.endpoint_url.is_none());
        assert!(!config.force_path_style);
        assert!(config.region.is_none());
        assert!(config.access_key_id.is_none());
        assert!(config.secret_access_key.is_none());
        assert!(config.profile.is_none());
    }
}
