//! Run configuration model.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{BuildcloudError, Result};

/// Tunables for a run. Every field defaults to the fixed constants, so a
/// configuration file only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildcloudConfig {
    /// Prefix prepended to every environment name.
    pub env_prefix: String,
    /// Private key file inside the credential home.
    pub ssh_key_source: String,
    /// Test harness image.
    pub container_image: String,
    /// Non-root user inside the harness container.
    pub container_user: String,
    /// Constraint used while bootstrapping.
    pub bootstrap_constraints: String,
    /// Constraint applied once an environment is live.
    pub steady_constraints: String,
    /// Effective gid that identifies the CI service account.
    pub ci_group_id: u32,
    /// `user:group` the run root is handed to under CI.
    pub ci_owner: String,
    /// Log paths fetched from each machine.
    pub remote_logs: Vec<String>,
    /// Entries skipped when mirroring results.
    pub results_ignore: Vec<String>,
}

impl Default for BuildcloudConfig {
    fn default() -> Self {
        Self {
            env_prefix: constants::DEFAULT_ENV_PREFIX.to_string(),
            ssh_key_source: constants::DEFAULT_SSH_KEY_SOURCE.to_string(),
            container_image: constants::DEFAULT_CONTAINER_IMAGE.to_string(),
            container_user: constants::DEFAULT_CONTAINER_USER.to_string(),
            bootstrap_constraints: constants::DEFAULT_BOOTSTRAP_CONSTRAINTS.to_string(),
            steady_constraints: constants::DEFAULT_STEADY_CONSTRAINTS.to_string(),
            ci_group_id: constants::CI_GROUP_ID,
            ci_owner: constants::CI_OWNER.to_string(),
            remote_logs: constants::REMOTE_LOG_PATTERNS.map(String::from).to_vec(),
            results_ignore: constants::RESULTS_IGNORE_PATTERNS.map(String::from).to_vec(),
        }
    }
}

impl BuildcloudConfig {
    /// Loads a configuration file, filling absent fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML, or
    /// names an empty environment prefix.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| BuildcloudError::io(path, e))?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Checks invariants the run depends on.
    ///
    /// # Errors
    ///
    /// Returns [`BuildcloudError::Config`] when the prefix or container user
    /// is empty.
    pub fn validate(&self) -> Result<()> {
        if self.env_prefix.is_empty() {
            return Err(BuildcloudError::Config {
                message: "env-prefix must not be empty".into(),
            });
        }
        if self.container_user.is_empty() {
            return Err(BuildcloudError::Config {
                message: "container-user must not be empty".into(),
            });
        }
        Ok(())
    }
}
