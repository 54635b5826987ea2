//! Auditor integration tests against a scripted in-memory IAM API.
//!
//! The fake counts calls per operation so the tests can assert which
//! remote fetches actually happened, and its key store is mutable so the
//! disable round-trip can be observed through a fresh enumeration.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use kw_audit::{AuditPolicy, KeyAuditor, LastUsed};
use kw_common::KeyStatus;
use kw_iam::{IamApi, IamError, KeyLastUsed, KeyMetadata, UserSummary};

struct FakeKey {
    metadata: KeyMetadata,
    last_used: Option<DateTime<Utc>>,
}

struct FakeUser {
    name: String,
    keys: Vec<FakeKey>,
}

#[derive(Default)]
struct FakeIam {
    users: Mutex<Vec<FakeUser>>,
    deny_list_users: bool,
    fail_list_keys_for: Option<String>,
    list_users_calls: AtomicUsize,
    list_access_keys_calls: AtomicUsize,
    get_last_used_calls: AtomicUsize,
    update_access_key_calls: AtomicUsize,
}

impl FakeIam {
    fn with_users(users: Vec<FakeUser>) -> Self {
        Self {
            users: Mutex::new(users),
            ..Self::default()
        }
    }

    fn deny_list_users(mut self) -> Self {
        self.deny_list_users = true;
        self
    }

    fn fail_list_keys_for(mut self, user_name: &str) -> Self {
        self.fail_list_keys_for = Some(user_name.to_string());
        self
    }
}

#[async_trait]
impl IamApi for FakeIam {
    async fn list_users(&self) -> kw_iam::Result<Vec<UserSummary>> {
        self.list_users_calls.fetch_add(1, Ordering::SeqCst);
        if self.deny_list_users {
            return Err(IamError::AccessDenied {
                operation: "ListUsers",
            });
        }
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .map(|user| UserSummary {
                user_name: user.name.clone(),
            })
            .collect())
    }

    async fn list_access_keys(&self, user_name: &str) -> kw_iam::Result<Vec<KeyMetadata>> {
        self.list_access_keys_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list_keys_for.as_deref() == Some(user_name) {
            return Err(IamError::Api {
                operation: "ListAccessKeys",
                code: "ServiceFailure".to_string(),
                message: "simulated service failure".to_string(),
            });
        }
        let users = self.users.lock().unwrap();
        let keys = users
            .iter()
            .find(|user| user.name == user_name)
            .map(|user| user.keys.iter().map(|key| key.metadata.clone()).collect())
            .unwrap_or_default();
        Ok(keys)
    }

    async fn get_access_key_last_used(&self, access_key_id: &str) -> kw_iam::Result<KeyLastUsed> {
        self.get_last_used_calls.fetch_add(1, Ordering::SeqCst);
        let users = self.users.lock().unwrap();
        for user in users.iter() {
            for key in &user.keys {
                if key.metadata.access_key_id == access_key_id {
                    return Ok(KeyLastUsed {
                        last_used_date: key.last_used,
                    });
                }
            }
        }
        Err(IamError::Api {
            operation: "GetAccessKeyLastUsed",
            code: "NoSuchEntity".to_string(),
            message: format!("Unknown access key {access_key_id}"),
        })
    }

    async fn update_access_key(
        &self,
        user_name: &str,
        access_key_id: &str,
        status: KeyStatus,
    ) -> kw_iam::Result<()> {
        self.update_access_key_calls.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.lock().unwrap();
        for user in users.iter_mut() {
            if user.name != user_name {
                continue;
            }
            for key in user.keys.iter_mut() {
                if key.metadata.access_key_id == access_key_id {
                    key.metadata.status = status;
                    return Ok(());
                }
            }
        }
        Err(IamError::Api {
            operation: "UpdateAccessKey",
            code: "NoSuchEntity".to_string(),
            message: format!("Unknown access key {user_name}/{access_key_id}"),
        })
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn policy() -> AuditPolicy {
    AuditPolicy::from_days(now(), 90, 30)
}

fn fake_key(
    id: &str,
    status: KeyStatus,
    age_days: i64,
    last_used_days_ago: Option<i64>,
) -> FakeKey {
    FakeKey {
        metadata: KeyMetadata {
            access_key_id: id.to_string(),
            status,
            create_date: now() - Duration::days(age_days),
        },
        last_used: last_used_days_ago.map(|days| now() - Duration::days(days)),
    }
}

fn fake_user(name: &str, keys: Vec<FakeKey>) -> FakeUser {
    FakeUser {
        name: name.to_string(),
        keys,
    }
}

fn auditor(fake: &Arc<FakeIam>) -> KeyAuditor {
    KeyAuditor::new(fake.clone(), "123456789012", policy())
}

#[tokio::test]
async fn test_full_run_classifies_keys() {
    let fake = Arc::new(FakeIam::with_users(vec![
        fake_user(
            "alice",
            vec![
                // Stale but recently used.
                fake_key("AKIA_OLD", KeyStatus::Active, 400, Some(2)),
                // Fresh but idle past the threshold.
                fake_key("AKIA_IDLE", KeyStatus::Active, 40, Some(35)),
                // Fresh and recently used.
                fake_key("AKIA_OK", KeyStatus::Active, 10, Some(5)),
            ],
        ),
        fake_user("bob", vec![]),
    ]));

    let mut auditor = auditor(&fake);
    assert!(auditor.check(None, true).await);

    let alice = auditor.user("alice").unwrap();
    assert_eq!(alice.keys().len(), 3);

    let stale: Vec<&str> = alice.stale_keys().iter().map(|key| key.id()).collect();
    assert_eq!(stale, vec!["AKIA_OLD"]);

    let inactive: Vec<&str> = alice
        .inactive_keys()
        .unwrap()
        .iter()
        .map(|key| key.id())
        .collect();
    assert_eq!(inactive, vec!["AKIA_IDLE"]);

    let bob = auditor.user("bob").unwrap();
    assert!(bob.keys().is_empty());

    let report = auditor.report();
    assert_eq!(report.total_keys, 3);
    assert_eq!(report.stale_keys, 1);
    assert_eq!(report.inactive_keys, 1);
    assert_eq!(report.generated_at, now());
}

#[tokio::test]
async fn test_filter_skips_remote_fetches_for_excluded_users() {
    let fake = Arc::new(FakeIam::with_users(vec![
        fake_user("alice", vec![fake_key("AKIA_A", KeyStatus::Active, 10, Some(1))]),
        fake_user("bob", vec![fake_key("AKIA_B", KeyStatus::Active, 10, Some(1))]),
    ]));

    let mut auditor = auditor(&fake);
    let filter = vec!["alice".to_string()];
    assert!(auditor.check(Some(&filter), true).await);

    assert_eq!(auditor.users().len(), 1);
    assert_eq!(auditor.users()[0].name(), "alice");
    assert!(auditor.user("bob").is_none());

    // Bob's credentials were never fetched.
    assert_eq!(fake.list_access_keys_calls.load(Ordering::SeqCst), 1);
    assert_eq!(fake.get_last_used_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_list_users_denied_fails_run_before_any_fetch() {
    let fake = Arc::new(
        FakeIam::with_users(vec![fake_user("alice", vec![])]).deny_list_users(),
    );

    let mut auditor = auditor(&fake);
    assert!(!auditor.check(None, true).await);

    assert!(auditor.users().is_empty());
    assert_eq!(fake.list_access_keys_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_list_keys_failure_aborts_run_with_partial_state() {
    let fake = Arc::new(
        FakeIam::with_users(vec![
            fake_user("alice", vec![fake_key("AKIA_A", KeyStatus::Active, 400, Some(2))]),
            fake_user("bob", vec![fake_key("AKIA_B", KeyStatus::Active, 10, Some(1))]),
            fake_user("carol", vec![fake_key("AKIA_C", KeyStatus::Active, 10, Some(1))]),
        ])
        .fail_list_keys_for("bob"),
    );

    let mut auditor = auditor(&fake);
    assert!(!auditor.check(None, true).await);

    // First user fully populated, failing user present but empty, later
    // users never reached.
    assert_eq!(auditor.users().len(), 2);
    assert_eq!(auditor.users()[0].name(), "alice");
    assert_eq!(auditor.users()[0].keys().len(), 1);
    assert_eq!(auditor.users()[1].name(), "bob");
    assert!(auditor.users()[1].keys().is_empty());
    assert!(auditor.user("carol").is_none());

    assert_eq!(fake.get_last_used_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_last_used_check_disabled_skips_lookup() {
    let fake = Arc::new(FakeIam::with_users(vec![fake_user(
        "svc",
        vec![fake_key("AKIA_S", KeyStatus::Active, 400, Some(2))],
    )]));

    let mut auditor = auditor(&fake);
    assert!(auditor.check(None, false).await);
    assert_eq!(fake.get_last_used_calls.load(Ordering::SeqCst), 0);

    let svc = auditor.user("svc").unwrap();
    let key = svc.key("AKIA_S").unwrap();
    assert!(key.is_stale());
    assert_eq!(key.last_used(), LastUsed::Unresolved);
    assert!(key.is_inactive().is_err());
    assert!(svc.inactive_keys().is_err());

    // The report marks inactive classification as not evaluated.
    let report = auditor.report();
    assert_eq!(report.users[0].keys[0].inactive, None);
    assert!(report.users[0].keys[0].stale);
}

#[tokio::test]
async fn test_never_used_key_resolves_to_create_date() {
    let fake = Arc::new(FakeIam::with_users(vec![fake_user(
        "svc",
        vec![fake_key("AKIA_S", KeyStatus::Active, 400, None)],
    )]));

    let mut auditor = auditor(&fake);
    assert!(auditor.check(None, true).await);

    let key = auditor.user("svc").unwrap().key("AKIA_S").unwrap();
    assert_eq!(key.last_used(), LastUsed::Resolved(key.create_date()));
    assert!(key.is_stale());
    assert!(key.is_inactive().unwrap());
}

#[tokio::test]
async fn test_inactive_status_key_skips_last_used_lookup() {
    let fake = Arc::new(FakeIam::with_users(vec![fake_user(
        "svc",
        vec![
            fake_key("AKIA_DEAD", KeyStatus::Inactive, 500, None),
            fake_key("AKIA_LIVE", KeyStatus::Active, 10, Some(1)),
        ],
    )]));

    let mut auditor = auditor(&fake);
    assert!(auditor.check(None, true).await);

    // Only the active key was looked up.
    assert_eq!(fake.get_last_used_calls.load(Ordering::SeqCst), 1);

    let svc = auditor.user("svc").unwrap();
    let dead = svc.key("AKIA_DEAD").unwrap();
    assert!(!dead.is_stale());
    assert_eq!(dead.is_inactive().unwrap(), false);
    assert_eq!(dead.last_used(), LastUsed::Unresolved);
}

#[tokio::test]
async fn test_disable_round_trip() {
    let fake = Arc::new(FakeIam::with_users(vec![fake_user(
        "svc",
        vec![fake_key("AKIA_S", KeyStatus::Active, 400, Some(2))],
    )]));

    let mut auditor = auditor(&fake);
    assert!(auditor.check(None, true).await);

    let key = auditor.user("svc").unwrap().key("AKIA_S").unwrap();
    assert!(key.is_stale());

    key.disable(fake.as_ref()).await.unwrap();
    assert_eq!(fake.update_access_key_calls.load(Ordering::SeqCst), 1);

    // The in-memory model keeps the status it was enumerated with.
    assert_eq!(key.status(), KeyStatus::Active);

    // A fresh enumeration observes the remote change.
    let refreshed = fake.list_access_keys("svc").await.unwrap();
    assert_eq!(refreshed[0].status, KeyStatus::Inactive);
}
