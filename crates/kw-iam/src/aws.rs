//! AWS IAM client
//!
//! Configuration via the standard AWS SDK chain (env vars, profiles,
//! instance metadata). Region and endpoint overrides are for testing
//! against LocalStack-style stand-ins.

use async_trait::async_trait;
use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_iam::primitives::DateTime as SdkDateTime;
use aws_sdk_iam::types::{AccessKeyMetadata as SdkKeyMetadata, StatusType};
use aws_sdk_iam::Client;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use kw_common::KeyStatus;

use crate::{IamApi, IamError, KeyLastUsed, KeyMetadata, Result, UserSummary};

/// IAM client backed by the AWS SDK.
pub struct AwsIamClient {
    client: Client,
}

impl AwsIamClient {
    /// Create a client from the default credential chain.
    pub async fn new(region: Option<String>, endpoint_url: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        if let Some(endpoint_url) = &endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let config = loader.load().await;

        info!(custom_endpoint = endpoint_url.is_some(), "Initialized AWS IAM client");
        Self {
            client: Client::new(&config),
        }
    }

    /// Wrap an already-configured SDK client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IamApi for AwsIamClient {
    async fn list_users(&self) -> Result<Vec<UserSummary>> {
        let mut users = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut request = self.client.list_users();
            if let Some(marker) = &marker {
                request = request.marker(marker);
            }

            let response = request
                .send()
                .await
                .map_err(|e| map_sdk_error("ListUsers", e))?;

            for user in response.users() {
                users.push(UserSummary {
                    user_name: user.user_name().to_string(),
                });
            }

            if response.is_truncated() {
                marker = response.marker().map(str::to_string);
            } else {
                break;
            }
        }

        debug!(count = users.len(), "Listed IAM users");
        Ok(users)
    }

    async fn list_access_keys(&self, user_name: &str) -> Result<Vec<KeyMetadata>> {
        let mut keys = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut request = self.client.list_access_keys().user_name(user_name);
            if let Some(marker) = &marker {
                request = request.marker(marker);
            }

            let response = request
                .send()
                .await
                .map_err(|e| map_sdk_error("ListAccessKeys", e))?;

            for metadata in response.access_key_metadata() {
                keys.push(parse_key_metadata(metadata)?);
            }

            if response.is_truncated() {
                marker = response.marker().map(str::to_string);
            } else {
                break;
            }
        }

        debug!(user_name, count = keys.len(), "Listed access keys");
        Ok(keys)
    }

    async fn get_access_key_last_used(&self, access_key_id: &str) -> Result<KeyLastUsed> {
        let response = self
            .client
            .get_access_key_last_used()
            .access_key_id(access_key_id)
            .send()
            .await
            .map_err(|e| map_sdk_error("GetAccessKeyLastUsed", e))?;

        let last_used_date = response
            .access_key_last_used()
            .and_then(|details| details.last_used_date())
            .and_then(to_utc);

        Ok(KeyLastUsed { last_used_date })
    }

    async fn update_access_key(
        &self,
        user_name: &str,
        access_key_id: &str,
        status: KeyStatus,
    ) -> Result<()> {
        let status_type = match status {
            KeyStatus::Active => StatusType::Active,
            KeyStatus::Inactive => StatusType::Inactive,
        };

        self.client
            .update_access_key()
            .user_name(user_name)
            .access_key_id(access_key_id)
            .status(status_type)
            .send()
            .await
            .map_err(|e| map_sdk_error("UpdateAccessKey", e))?;

        debug!(user_name, access_key_id, status = %status, "Updated access key status");
        Ok(())
    }
}

fn parse_key_metadata(metadata: &SdkKeyMetadata) -> Result<KeyMetadata> {
    let access_key_id = metadata
        .access_key_id()
        .ok_or_else(|| malformed("ListAccessKeys", "AccessKeyId"))?;

    let status = match metadata.status() {
        Some(StatusType::Active) => KeyStatus::Active,
        Some(StatusType::Inactive) => KeyStatus::Inactive,
        Some(other) => {
            return Err(IamError::Api {
                operation: "ListAccessKeys",
                code: "MalformedResponse".to_string(),
                message: format!("Unexpected access key status: {}", other.as_str()),
            })
        }
        None => return Err(malformed("ListAccessKeys", "Status")),
    };

    let create_date = metadata
        .create_date()
        .and_then(to_utc)
        .ok_or_else(|| malformed("ListAccessKeys", "CreateDate"))?;

    Ok(KeyMetadata {
        access_key_id: access_key_id.to_string(),
        status,
        create_date,
    })
}

fn malformed(operation: &'static str, field: &str) -> IamError {
    IamError::Api {
        operation,
        code: "MalformedResponse".to_string(),
        message: format!("Response is missing required field {field}"),
    }
}

fn to_utc(timestamp: &SdkDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
}

fn map_sdk_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> IamError
where
    E: ProvideErrorMetadata + std::fmt::Debug + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err.code().map(str::to_string);
    let message = DisplayErrorContext(&err).to_string();
    IamError::from_remote(operation, code, message)
}
