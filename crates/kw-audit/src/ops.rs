//! The one mutation the auditor performs.
//!
//! Failures propagate to the caller unchanged; no retry, no
//! interpretation.

use kw_common::KeyStatus;
use kw_iam::IamApi;

/// Set the status of the given user's access key in the remote system.
pub async fn update_access_key_status(
    client: &dyn IamApi,
    user_name: &str,
    access_key_id: &str,
    status: KeyStatus,
) -> kw_iam::Result<()> {
    client
        .update_access_key(user_name, access_key_id, status)
        .await
}

/// Make the given access key `Inactive`.
///
/// Setting `Inactive` twice is harmless remotely.
pub async fn disable_access_key(
    client: &dyn IamApi,
    user_name: &str,
    access_key_id: &str,
) -> kw_iam::Result<()> {
    update_access_key_status(client, user_name, access_key_id, KeyStatus::Inactive).await
}
