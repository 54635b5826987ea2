use chrono::{DateTime, Utc};
use kw_common::KeyStatus;
use serde::{Deserialize, Serialize};

/// One user as returned by the list-users call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_name: String,
}

/// Access key metadata as returned by the list-access-keys call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetadata {
    pub access_key_id: String,
    pub status: KeyStatus,
    pub create_date: DateTime<Utc>,
}

/// Last-used details for one access key.
///
/// `last_used_date` is absent for keys that have never been used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyLastUsed {
    pub last_used_date: Option<DateTime<Utc>>,
}
