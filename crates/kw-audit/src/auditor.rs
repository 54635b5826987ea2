use std::sync::Arc;

use tracing::{debug, error};

use kw_common::{AuditReport, KeyFinding, KeyStatus, UserReport};
use kw_iam::{IamApi, IamError};

use crate::{AuditPolicy, User};

/// Audits every access key in one account against a fixed policy.
///
/// One auditor performs one run: `check` populates the user collection
/// exactly once. Calling `check` again on the same instance appends
/// duplicate users; construct a fresh auditor per run instead.
pub struct KeyAuditor {
    client: Arc<dyn IamApi>,
    account: String,
    policy: AuditPolicy,
    users: Vec<User>,
}

impl KeyAuditor {
    pub fn new(client: Arc<dyn IamApi>, account: impl Into<String>, policy: AuditPolicy) -> Self {
        Self {
            client,
            account: account.into(),
            policy,
            users: Vec::new(),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn policy(&self) -> AuditPolicy {
        self.policy
    }

    /// Users gathered so far, in remote enumeration order. Partial after a
    /// failed run.
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Look a user up by name; first match wins.
    pub fn user(&self, name: &str) -> Option<&User> {
        self.users.iter().find(|user| user.name() == name)
    }

    /// Walk every user's access keys in the account and classify them.
    ///
    /// `users_filter` limits the audit to the named users; filtered-out
    /// users are skipped before any per-user call is made. When
    /// `check_last_used` is false the last-used lookup is skipped entirely
    /// and inactive classification stays unavailable for this run's keys.
    ///
    /// Aborts on the first remote failure: a model assembled from a
    /// partial snapshot must not be classified, so the error is logged,
    /// the users gathered so far remain as an explicitly partial result,
    /// and the whole scope is expected to be re-run. Returns `true` only
    /// when every remote call succeeded.
    pub async fn check(&mut self, users_filter: Option<&[String]>, check_last_used: bool) -> bool {
        let summaries = match self.client.list_users().await {
            Ok(summaries) => summaries,
            Err(err) => {
                log_remote_failure(&self.account, &err, "Failed to list users");
                return false;
            }
        };
        debug!(account = %self.account, count = summaries.len(), "Evaluating users");

        for summary in summaries {
            if let Some(filter) = users_filter {
                if !filter.contains(&summary.user_name) {
                    debug!(user_name = %summary.user_name, "Skipping user not in filter");
                    continue;
                }
            }

            // Appended before the per-user fetches so a later failure
            // still leaves the user visible in the partial result.
            let index = self.users.len();
            self.users.push(User::new(summary.user_name, self.policy));

            let keys = match self.client.list_access_keys(self.users[index].name()).await {
                Ok(keys) => keys,
                Err(err) => {
                    log_remote_failure(&self.account, &err, "Failed to list access keys");
                    return false;
                }
            };

            for metadata in keys {
                let key = self.users[index].add_key(metadata);

                if key.status() == KeyStatus::Inactive {
                    debug!(user_name = %key.user_name(), access_key_id = %key.id(), "Key is not active");
                    continue;
                }
                if !check_last_used {
                    debug!(user_name = %key.user_name(), access_key_id = %key.id(), "Last-used check disabled");
                    continue;
                }

                let details = match self.client.get_access_key_last_used(key.id()).await {
                    Ok(details) => details,
                    Err(err) => {
                        log_remote_failure(
                            &self.account,
                            &err,
                            "Failed to get access key last used",
                        );
                        return false;
                    }
                };
                key.resolve_last_used(&details);
            }
        }

        true
    }

    /// Serializable summary of the gathered state.
    ///
    /// After a failed run this reports the partial state; the caller owns
    /// that interpretation. Keys without last-used resolution report
    /// `inactive: None` rather than a fabricated classification.
    pub fn report(&self) -> AuditReport {
        let mut users = Vec::with_capacity(self.users.len());
        let mut total_keys = 0;
        let mut stale_total = 0;
        let mut inactive_total = 0;

        for user in &self.users {
            let mut findings = Vec::with_capacity(user.keys().len());
            for key in user.keys() {
                let stale = key.is_stale();
                let inactive = key.is_inactive().ok();

                total_keys += 1;
                if stale {
                    stale_total += 1;
                }
                if inactive == Some(true) {
                    inactive_total += 1;
                }

                findings.push(KeyFinding {
                    access_key_id: key.id().to_string(),
                    status: key.status(),
                    age_days: key.age_days(),
                    last_used_days: key.idle_days(),
                    stale,
                    inactive,
                });
            }
            users.push(UserReport {
                user_name: user.name().to_string(),
                keys: findings,
            });
        }

        AuditReport {
            account: self.account.clone(),
            generated_at: self.policy.now,
            users,
            total_keys,
            stale_keys: stale_total,
            inactive_keys: inactive_total,
        }
    }
}

fn log_remote_failure(account: &str, err: &IamError, context: &str) {
    if err.is_access_denied() {
        error!(account, operation = err.operation(), "Access denied");
    } else {
        error!(account, error = %err, "{}", context);
    }
}
