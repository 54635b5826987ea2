//! KeyWarden Configuration System
//!
//! This crate provides TOML-based configuration with environment variable
//! override support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub audit: AuditConfig,
    pub aws: AwsConfig,
    pub remediation: RemediationConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            audit: AuditConfig::default(),
            aws: AwsConfig::default(),
            remediation: RemediationConfig::default(),
        }
    }
}

/// Audit pass configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Maximum key age in days before a key is flagged stale
    pub rotation_max_age_days: i64,
    /// Maximum idle time in days before a key is flagged inactive
    pub inactive_max_age_days: i64,
    /// Whether to resolve last-used timestamps (required for inactive
    /// classification)
    pub check_last_used: bool,
    /// Audit only these users; empty means all users in the account
    pub users: Vec<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            rotation_max_age_days: 90,
            inactive_max_age_days: 30,
            check_last_used: true,
            users: Vec::new(),
        }
    }
}

/// AWS client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    /// Label for the audited account, used in logs and reports
    pub account: String,
    /// AWS region (empty = SDK default chain)
    pub region: String,
    /// Endpoint override (empty = real AWS; set for LocalStack)
    pub endpoint_url: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            account: "default".to_string(),
            region: String::new(),
            endpoint_url: String::new(),
        }
    }
}

/// Remediation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemediationConfig {
    /// Disable keys flagged stale after a successful audit
    pub disable_stale: bool,
    /// Disable keys flagged inactive after a successful audit
    pub disable_inactive: bool,
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            disable_stale: false,
            disable_inactive: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        let loader = ConfigLoader::new();
        loader.load()
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# KeyWarden Configuration
# Environment variables (KEYWARDEN_*) override these settings

[audit]
rotation_max_age_days = 90
inactive_max_age_days = 30
check_last_used = true
users = []

[aws]
account = "default"
region = ""
endpoint_url = ""

[remediation]
disable_stale = false
disable_inactive = false
"#
        .to_string()
    }
}
