use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    /// Inactive classification was requested for a key whose last-used
    /// timestamp was never resolved. Runs that skip last-used resolution
    /// must not ask for this classification.
    #[error("Last-used timestamp not resolved for {user_name}/{access_key_id}")]
    LastUsedUnresolved {
        user_name: String,
        access_key_id: String,
    },
}
