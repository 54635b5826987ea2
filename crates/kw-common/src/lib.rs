use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod logging;

// ============================================================================
// Access Key Status
// ============================================================================

/// Lifecycle status of an access key as reported by the identity API.
///
/// Serializes to the wire strings `"Active"` / `"Inactive"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyStatus {
    Active,
    Inactive,
}

impl KeyStatus {
    /// Wire representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyStatus::Active => "Active",
            KeyStatus::Inactive => "Inactive",
        }
    }
}

impl std::fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for KeyStatus {
    type Err = ParseKeyStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(KeyStatus::Active),
            "inactive" => Ok(KeyStatus::Inactive),
            _ => Err(ParseKeyStatusError(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown access key status: {0}")]
pub struct ParseKeyStatusError(String);

// ============================================================================
// Audit Report Types
// ============================================================================

/// Classification outcome for a single access key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyFinding {
    pub access_key_id: String,
    pub status: KeyStatus,
    /// Key age at audit time, in whole days.
    pub age_days: i64,
    /// Days since the key was last used; `None` until last-used resolution ran.
    pub last_used_days: Option<i64>,
    pub stale: bool,
    /// `None` when the run skipped last-used resolution.
    pub inactive: Option<bool>,
}

/// All findings for one user, in remote enumeration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserReport {
    pub user_name: String,
    pub keys: Vec<KeyFinding>,
}

/// Summary of one audit pass over an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub account: String,
    /// The temporal reference every classification in this report used.
    pub generated_at: DateTime<Utc>,
    pub users: Vec<UserReport>,
    pub total_keys: usize,
    pub stale_keys: usize,
    pub inactive_keys: usize,
}
