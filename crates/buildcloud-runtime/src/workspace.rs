//! Per-run isolated workspace: host directory tree, renamed environments,
//! and the matching container-side path layout.

use std::path::{Path, PathBuf};

use buildcloud_common::config::BuildcloudConfig;
use buildcloud_common::constants::{
    DEPLOYER_CACHE_DIR, ENVIRONMENTS_FILE, HOST_JUJU_HOME_DIR, HOST_REPOSITORY_DIR,
    HOST_RESULTS_DIR, HOST_SSH_DIR, HOST_TMP_DIR, LIVE_STATE_ENTRY, RUN_ROOT_PREFIX, SSH_KEY_NAME,
};
use buildcloud_common::error::{BuildcloudError, Result};
use buildcloud_common::types::EnvironmentIdentity;
use tempfile::TempDir;

use crate::environments::rename_env;
use crate::fsutil::{copy_file, copy_tree, ensure_dir};

/// Host-side paths of one run, all under a freshly created root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostLayout {
    /// Isolated run root.
    pub root: PathBuf,
    /// Duplicated credential home.
    pub juju_home: PathBuf,
    /// Shared dependency cache.
    pub repository: PathBuf,
    /// Harness results.
    pub results: PathBuf,
    /// Scratch space.
    pub tmp: PathBuf,
    /// SSH material mounted as the container user's `~/.ssh`.
    pub ssh: PathBuf,
    /// Renamed environments, in the order they were requested.
    pub environments: Vec<EnvironmentIdentity>,
}

impl HostLayout {
    /// Returns the run-scoped environment names in request order.
    #[must_use]
    pub fn environment_names(&self) -> Vec<&str> {
        self.environments.iter().map(EnvironmentIdentity::renamed).collect()
    }

    /// Host-side deployer cache, mounted inside the container's credential home.
    #[must_use]
    pub fn deployer_cache(&self) -> PathBuf {
        self.tmp.join(DEPLOYER_CACHE_DIR)
    }
}

/// Fixed container-side paths, derived from the container user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerLayout {
    /// User the harness runs as.
    pub user: String,
    /// Harness image.
    pub image: String,
    /// Container home and working directory.
    pub home: PathBuf,
    /// `~/.ssh`.
    pub ssh_home: PathBuf,
    /// Orchestration tool home.
    pub juju_home: PathBuf,
    /// Results directory.
    pub results: PathBuf,
    /// Dependency cache.
    pub repository: PathBuf,
    /// Directory the test plan's parent is mounted on.
    pub test_plans: PathBuf,
}

impl ContainerLayout {
    /// Lays out the container paths for `user`.
    #[must_use]
    pub fn new(user: &str, image: &str) -> Self {
        let home = Path::new("/home").join(user);
        Self {
            user: user.to_string(),
            image: image.to_string(),
            ssh_home: home.join(".ssh"),
            juju_home: home.join(".juju"),
            results: home.join("results"),
            repository: home.join("charm-repo"),
            test_plans: home.join("test_plans"),
            home,
        }
    }

    /// Deployer cache location inside the container's credential home.
    #[must_use]
    pub fn deployer_cache(&self) -> PathBuf {
        self.juju_home.join(DEPLOYER_CACHE_DIR)
    }
}

/// A built run workspace. Dropping it removes the whole root tree.
#[derive(Debug)]
pub struct RunWorkspace {
    root: TempDir,
    /// Host-side paths.
    pub host: HostLayout,
    /// Container-side paths.
    pub container: ContainerLayout,
}

impl RunWorkspace {
    /// Returns the run root.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.root.path()
    }
}

/// Builds [`RunWorkspace`]s from a caller's credential home.
#[derive(Debug)]
pub struct EnvironmentBuilder<'a> {
    config: &'a BuildcloudConfig,
    temp_parent: Option<PathBuf>,
}

impl<'a> EnvironmentBuilder<'a> {
    /// Creates a builder using `config` for names and prefixes.
    #[must_use]
    pub const fn new(config: &'a BuildcloudConfig) -> Self {
        Self {
            config,
            temp_parent: None,
        }
    }

    /// Creates run roots under `parent` instead of the system temp dir.
    #[must_use]
    pub fn temp_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.temp_parent = Some(parent.into());
        self
    }

    /// Creates the run root, duplicates `juju_home` into it without live
    /// environment state, installs the SSH key, and renames each requested
    /// environment with the run prefix.
    ///
    /// The root is removed again if any step fails.
    ///
    /// # Errors
    ///
    /// Returns an error if `environments` is empty, the credential home or
    /// key cannot be copied, or a requested environment is not in the
    /// environments document.
    pub fn build(&self, juju_home: &Path, environments: &[String]) -> Result<RunWorkspace> {
        if environments.is_empty() {
            return Err(BuildcloudError::Config {
                message: "at least one environment is required".into(),
            });
        }
        if !juju_home.is_dir() {
            return Err(BuildcloudError::Config {
                message: format!("juju home {} is not a directory", juju_home.display()),
            });
        }

        let root = self.create_root()?;
        let root_path = root.path().to_path_buf();
        tracing::info!(root = %root_path.display(), "created run root");

        let tmp_juju_home = root_path.join(HOST_JUJU_HOME_DIR);
        copy_tree(juju_home, &tmp_juju_home, &[LIVE_STATE_ENTRY])?;

        let repository = ensure_dir(HOST_REPOSITORY_DIR, &root_path)?;
        let results = ensure_dir(HOST_RESULTS_DIR, &root_path)?;
        let tmp = ensure_dir(HOST_TMP_DIR, &root_path)?;
        let ssh = ensure_dir(HOST_SSH_DIR, &tmp)?;
        copy_file(
            &tmp_juju_home.join(&self.config.ssh_key_source),
            &ssh.join(SSH_KEY_NAME),
        )?;

        let document = tmp_juju_home.join(ENVIRONMENTS_FILE);
        let renamed = environments
            .iter()
            .map(|name| rename_env(name, &self.config.env_prefix, &document))
            .collect::<Result<Vec<_>>>()?;

        let host = HostLayout {
            root: root_path,
            juju_home: tmp_juju_home,
            repository,
            results,
            tmp,
            ssh,
            environments: renamed,
        };
        let container =
            ContainerLayout::new(&self.config.container_user, &self.config.container_image);
        tracing::debug!(?host, ?container, "run workspace ready");

        Ok(RunWorkspace {
            root,
            host,
            container,
        })
    }

    fn create_root(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        let _ = builder.prefix(RUN_ROOT_PREFIX);
        let created = match &self.temp_parent {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        };
        created.map_err(|e| {
            BuildcloudError::io(
                self.temp_parent.clone().unwrap_or_else(std::env::temp_dir),
                e,
            )
        })
    }
}
