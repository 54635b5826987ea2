use chrono::{DateTime, Duration, Utc};

/// Temporal reference and age thresholds for one audit run.
///
/// Fixed at auditor construction and copied by value into every user and
/// key, so every classification in a run compares against the same
/// instant and the same policy. The predicates never read a clock.
#[derive(Debug, Clone, Copy)]
pub struct AuditPolicy {
    /// The single "current time" for the run.
    pub now: DateTime<Utc>,
    /// Maximum age before an active key counts as stale.
    pub rotation_max_age: Duration,
    /// Maximum idle time before an active key counts as inactive.
    pub inactive_max_age: Duration,
}

impl AuditPolicy {
    pub fn new(now: DateTime<Utc>, rotation_max_age: Duration, inactive_max_age: Duration) -> Self {
        Self {
            now,
            rotation_max_age,
            inactive_max_age,
        }
    }

    /// Policy with both thresholds given in days.
    pub fn from_days(now: DateTime<Utc>, rotation_days: i64, inactive_days: i64) -> Self {
        Self::new(now, Duration::days(rotation_days), Duration::days(inactive_days))
    }
}
