//! Identity-management API capability.
//!
//! The audit core talks to the identity provider exclusively through the
//! [`IamApi`] trait: three reads (users, access keys, last-used details) and
//! one mutation (access key status). The concrete AWS IAM client lives
//! behind the `aws` feature flag so the core builds and tests without AWS
//! linkage.

use async_trait::async_trait;
use kw_common::KeyStatus;

pub mod error;
mod types;

#[cfg(feature = "aws")]
pub mod aws;

pub use error::IamError;
pub use types::{KeyLastUsed, KeyMetadata, UserSummary};

#[cfg(feature = "aws")]
pub use aws::AwsIamClient;

pub type Result<T> = std::result::Result<T, IamError>;

/// Capability handle for the identity-management API of one account.
///
/// All calls are issued one at a time by the caller; implementations own
/// timeouts and transport concerns, never retries.
#[async_trait]
pub trait IamApi: Send + Sync {
    /// List every user in the account.
    async fn list_users(&self) -> Result<Vec<UserSummary>>;

    /// List the access keys owned by one user.
    async fn list_access_keys(&self, user_name: &str) -> Result<Vec<KeyMetadata>>;

    /// Fetch when an access key was last used.
    ///
    /// A response without a timestamp is valid and means "never used".
    async fn get_access_key_last_used(&self, access_key_id: &str) -> Result<KeyLastUsed>;

    /// Set an access key's status.
    async fn update_access_key(
        &self,
        user_name: &str,
        access_key_id: &str,
        status: KeyStatus,
    ) -> Result<()>;
}
