//! KeyWarden access key auditor
//!
//! Runs one audit pass over the account the AWS credential chain resolves
//! to: enumerates IAM users and their access keys, classifies each key as
//! stale and/or inactive against the configured thresholds, prints the
//! report as JSON on stdout, and (when enabled) disables flagged keys.
//!
//! The audit pass is fail-fast: the first remote error aborts the run and
//! the process exits non-zero, with the partial report still printed for
//! inspection. The remediation pass is best-effort: each flagged key is
//! disabled independently and failures are logged without stopping the
//! pass.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing::{error, info};

use kw_audit::{AuditPolicy, KeyAuditor};
use kw_config::{AppConfig, ConfigLoader};
use kw_iam::{AwsIamClient, IamApi};

#[derive(Parser, Debug)]
#[command(
    name = "kw-auditor",
    about = "Audit IAM access keys against a rotation policy"
)]
struct Args {
    /// Path to a keywarden.toml configuration file
    #[arg(long, env = "KEYWARDEN_CONFIG")]
    config: Option<PathBuf>,

    /// Audit only these users (repeatable; overrides the configured filter)
    #[arg(long = "user")]
    users: Vec<String>,

    /// Disable all flagged keys after a successful audit
    #[arg(long)]
    remediate: bool,

    /// Print an example configuration file and exit
    #[arg(long)]
    example_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for local development)
    let _ = dotenvy::dotenv();

    kw_common::logging::init_logging("kw-auditor");

    let args = Args::parse();

    if args.example_config {
        print!("{}", AppConfig::example_toml());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => ConfigLoader::with_path(path.clone()).load()?,
        None => AppConfig::load()?,
    };

    let client: Arc<dyn IamApi> = Arc::new(
        AwsIamClient::new(
            non_empty(&config.aws.region),
            non_empty(&config.aws.endpoint_url),
        )
        .await,
    );

    let policy = AuditPolicy::from_days(
        Utc::now(),
        config.audit.rotation_max_age_days,
        config.audit.inactive_max_age_days,
    );

    let users_filter = if !args.users.is_empty() {
        Some(args.users.clone())
    } else if !config.audit.users.is_empty() {
        Some(config.audit.users.clone())
    } else {
        None
    };

    info!(
        account = %config.aws.account,
        rotation_max_age_days = config.audit.rotation_max_age_days,
        inactive_max_age_days = config.audit.inactive_max_age_days,
        check_last_used = config.audit.check_last_used,
        "Starting access key audit"
    );

    let mut auditor = KeyAuditor::new(client.clone(), config.aws.account.clone(), policy);
    let ok = auditor
        .check(users_filter.as_deref(), config.audit.check_last_used)
        .await;

    let report = auditor.report();
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !ok {
        error!("Audit run failed; the report covers only the state gathered before the failure");
        anyhow::bail!("audit run failed");
    }

    info!(
        users = report.users.len(),
        total_keys = report.total_keys,
        stale_keys = report.stale_keys,
        inactive_keys = report.inactive_keys,
        "Audit complete"
    );

    let disable_stale = args.remediate || config.remediation.disable_stale;
    let disable_inactive =
        (args.remediate || config.remediation.disable_inactive) && config.audit.check_last_used;

    if disable_stale || disable_inactive {
        remediate(client.as_ref(), &auditor, disable_stale, disable_inactive).await;
    }

    Ok(())
}

/// Disable flagged keys, continuing past per-key failures: every disable
/// is independent and setting Inactive twice is harmless remotely.
async fn remediate(
    client: &dyn IamApi,
    auditor: &KeyAuditor,
    disable_stale: bool,
    disable_inactive: bool,
) {
    let mut disabled = 0usize;
    let mut failed = 0usize;

    for user in auditor.users() {
        for key in user.keys() {
            let flagged = (disable_stale && key.is_stale())
                || (disable_inactive && matches!(key.is_inactive(), Ok(true)));
            if !flagged {
                continue;
            }

            match key.disable(client).await {
                Ok(()) => {
                    info!(
                        user_name = %key.user_name(),
                        access_key_id = %key.id(),
                        "Disabled access key"
                    );
                    disabled += 1;
                }
                Err(err) => {
                    error!(
                        user_name = %key.user_name(),
                        access_key_id = %key.id(),
                        error = %err,
                        "Failed to disable access key"
                    );
                    failed += 1;
                }
            }
        }
    }

    info!(disabled, failed, "Remediation pass complete");
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
