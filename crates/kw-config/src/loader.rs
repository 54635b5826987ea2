//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "keywarden.toml",
    "config.toml",
    "./config/keywarden.toml",
    "/etc/keywarden/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable
    /// overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        self.apply_env_overrides(&mut config);

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(&self) -> Option<PathBuf> {
        // Check explicit path first
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        // Check KEYWARDEN_CONFIG env var
        if let Ok(path) = env::var("KEYWARDEN_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // Search standard paths
        for path in CONFIG_PATHS {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&self, config: &mut AppConfig) {
        // Audit
        if let Ok(val) = env::var("KEYWARDEN_ROTATION_MAX_AGE_DAYS") {
            if let Ok(days) = val.parse() {
                config.audit.rotation_max_age_days = days;
            }
        }
        if let Ok(val) = env::var("KEYWARDEN_INACTIVE_MAX_AGE_DAYS") {
            if let Ok(days) = val.parse() {
                config.audit.inactive_max_age_days = days;
            }
        }
        if let Ok(val) = env::var("KEYWARDEN_CHECK_LAST_USED") {
            config.audit.check_last_used = val.parse().unwrap_or(true);
        }
        if let Ok(val) = env::var("KEYWARDEN_USERS") {
            config.audit.users = val.split(',').map(|s| s.trim().to_string()).collect();
        }

        // AWS
        if let Ok(val) = env::var("KEYWARDEN_AWS_ACCOUNT") {
            config.aws.account = val;
        }
        if let Ok(val) = env::var("KEYWARDEN_AWS_REGION") {
            config.aws.region = val;
        }
        if let Ok(val) = env::var("KEYWARDEN_AWS_ENDPOINT_URL") {
            config.aws.endpoint_url = val;
        }

        // Remediation
        if let Ok(val) = env::var("KEYWARDEN_DISABLE_STALE") {
            config.remediation.disable_stale = val.parse().unwrap_or(false);
        }
        if let Ok(val) = env::var("KEYWARDEN_DISABLE_INACTIVE") {
            config.remediation.disable_inactive = val.parse().unwrap_or(false);
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
