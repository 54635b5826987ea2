use kw_iam::KeyMetadata;

use crate::{AccessKey, AuditError, AuditPolicy};

/// One user and the access keys discovered for it, in enumeration order.
///
/// Every key of a user shares the policy the user was constructed with.
#[derive(Debug, Clone)]
pub struct User {
    name: String,
    policy: AuditPolicy,
    keys: Vec<AccessKey>,
}

impl User {
    pub fn new(name: impl Into<String>, policy: AuditPolicy) -> Self {
        Self {
            name: name.into(),
            policy,
            keys: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> AuditPolicy {
        self.policy
    }

    pub fn keys(&self) -> &[AccessKey] {
        &self.keys
    }

    /// Construct a key from raw metadata and append it.
    ///
    /// Returns the new key so the caller can resolve its last-used
    /// timestamp.
    pub fn add_key(&mut self, metadata: KeyMetadata) -> &mut AccessKey {
        let index = self.keys.len();
        self.keys.push(AccessKey::new(&self.name, metadata, self.policy));
        &mut self.keys[index]
    }

    /// Look a key up by id; first match wins.
    pub fn key(&self, access_key_id: &str) -> Option<&AccessKey> {
        self.keys.iter().find(|key| key.id() == access_key_id)
    }

    /// Keys flagged stale, in enumeration order.
    pub fn stale_keys(&self) -> Vec<&AccessKey> {
        self.keys.iter().filter(|key| key.is_stale()).collect()
    }

    /// Keys flagged inactive, in enumeration order.
    ///
    /// Errors if any active key is missing its last-used resolution.
    pub fn inactive_keys(&self) -> Result<Vec<&AccessKey>, AuditError> {
        let mut inactive = Vec::new();
        for key in &self.keys {
            if key.is_inactive()? {
                inactive.push(key);
            }
        }
        Ok(inactive)
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "User(Name={}, Keys={})", self.name, self.keys.len())
    }
}
