//! Credential verification
//!
//! A resolved [`SdkConfig`](aws_config::SdkConfig) only proves that some
//! credential source was found, not that it works. [`verify_credentials`]
//! makes a cheap STS `GetCallerIdentity` call so bad keys fail up front
//! instead of on the first real operation.

use aws_config::SdkConfig;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The identity behind the active credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub account: String,
    pub arn: String,
    pub user_id: String,
}

/// Check that the resolved credentials are usable.
pub async fn verify_credentials(config: &SdkConfig) -> Result<CallerIdentity> {
    let client = aws_sdk_sts::Client::new(config);

    let response = client
        .get_caller_identity()
        .send()
        .await
        .map_err(aws_sdk_sts::Error::from)?;

    let identity = CallerIdentity {
        account: response.account().unwrap_or_default().to_string(),
        arn: response.arn().unwrap_or_default().to_string(),
        user_id: response.user_id().unwrap_or_default().to_string(),
    };

    tracing::debug!(account = %identity.account, arn = %identity.arn, "verified credentials");

    Ok(identity)
}
