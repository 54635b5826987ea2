use chrono::{DateTime, Utc};
use tracing::debug;

use kw_common::KeyStatus;
use kw_iam::{IamApi, KeyLastUsed, KeyMetadata};

use crate::{ops, AuditError, AuditPolicy};

/// Resolution state of a key's last-used timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastUsed {
    /// The last-used lookup has not run for this key.
    Unresolved,
    Resolved(DateTime<Utc>),
}

/// One access key discovered during an audit run.
///
/// Carries its owner's name and a copy of the run policy so classification
/// and remediation need no pointer back through the object graph.
#[derive(Debug, Clone)]
pub struct AccessKey {
    id: String,
    user_name: String,
    status: KeyStatus,
    create_date: DateTime<Utc>,
    last_used: LastUsed,
    policy: AuditPolicy,
}

impl AccessKey {
    pub(crate) fn new(user_name: &str, metadata: KeyMetadata, policy: AuditPolicy) -> Self {
        debug!(user_name, access_key_id = %metadata.access_key_id, "Evaluating access key");
        Self {
            id: metadata.access_key_id,
            user_name: user_name.to_string(),
            status: metadata.status,
            create_date: metadata.create_date,
            last_used: LastUsed::Unresolved,
            policy,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// Status as reported at enumeration time. Not updated by [`disable`].
    ///
    /// [`disable`]: AccessKey::disable
    pub fn status(&self) -> KeyStatus {
        self.status
    }

    pub fn create_date(&self) -> DateTime<Utc> {
        self.create_date
    }

    pub fn last_used(&self) -> LastUsed {
        self.last_used
    }

    /// Record when the key was last used.
    ///
    /// A response without a timestamp means the key has never been used;
    /// the creation date stands in so the key's idle time counts from
    /// creation.
    pub fn resolve_last_used(&mut self, details: &KeyLastUsed) {
        match details.last_used_date {
            Some(last_used) => self.last_used = LastUsed::Resolved(last_used),
            None => {
                debug!(
                    user_name = %self.user_name,
                    access_key_id = %self.id,
                    "Key was never used, falling back to creation date"
                );
                self.last_used = LastUsed::Resolved(self.create_date);
            }
        }
    }

    /// Whether this key is active and was created longer ago than the
    /// rotation threshold. Keys already marked `Inactive` are never stale.
    pub fn is_stale(&self) -> bool {
        if self.status == KeyStatus::Inactive {
            return false;
        }
        self.policy.now - self.create_date > self.policy.rotation_max_age
    }

    /// Whether this key is active and has been unused for longer than the
    /// inactivity threshold.
    ///
    /// Errors if the last-used lookup never ran for this key. Keys already
    /// marked `Inactive` classify as `false` without needing resolution.
    pub fn is_inactive(&self) -> Result<bool, AuditError> {
        if self.status == KeyStatus::Inactive {
            return Ok(false);
        }
        match self.last_used {
            LastUsed::Resolved(last_used) => {
                Ok(self.policy.now - last_used > self.policy.inactive_max_age)
            }
            LastUsed::Unresolved => Err(AuditError::LastUsedUnresolved {
                user_name: self.user_name.clone(),
                access_key_id: self.id.clone(),
            }),
        }
    }

    /// Age of the key at audit time, in whole days.
    pub fn age_days(&self) -> i64 {
        (self.policy.now - self.create_date).num_days()
    }

    /// Days since the key was last used, once resolved.
    pub fn idle_days(&self) -> Option<i64> {
        match self.last_used {
            LastUsed::Resolved(last_used) => Some((self.policy.now - last_used).num_days()),
            LastUsed::Unresolved => None,
        }
    }

    /// Make this key `Inactive` in the remote system.
    ///
    /// Local state is left untouched; re-enumerate to observe the new
    /// status.
    pub async fn disable(&self, client: &dyn IamApi) -> kw_iam::Result<()> {
        ops::disable_access_key(client, &self.user_name, &self.id).await
    }
}

impl std::fmt::Display for AccessKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AccessKey(Id={}, Status={}, CreateDate={}, LastUsed={:?})",
            self.id, self.status, self.create_date, self.last_used
        )
    }
}
