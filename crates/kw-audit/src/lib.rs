//! Access key audit core.
//!
//! Models one account's users and their access keys, classifies each key
//! against a fixed [`AuditPolicy`] as stale (created longer ago than the
//! rotation threshold) and/or inactive (unused for longer than the
//! inactivity threshold), and exposes the single remote mutation the tool
//! performs: disabling a key.
//!
//! Enumeration is strictly sequential and fail-fast: the first remote
//! failure aborts the run, leaving whatever was gathered so far as an
//! explicitly partial result.

mod auditor;
mod error;
mod key;
mod policy;
mod user;

pub mod ops;

pub use auditor::KeyAuditor;
pub use error::AuditError;
pub use key::{AccessKey, LastUsed};
pub use policy::AuditPolicy;
pub use user::User;

pub type Result<T> = std::result::Result<T, AuditError>;
