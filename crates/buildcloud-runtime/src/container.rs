//! The harness container: image pull, bind mounts, harness command line and
//! optional results mirroring.

use std::path::{Path, PathBuf};

use buildcloud_common::error::{BuildcloudError, Result};

use crate::argv;
use crate::fsutil::copy_tree;
use crate::process::CommandRunner;
use crate::workspace::{ContainerLayout, HostLayout};

/// Inputs of one harness run that come from the caller rather than the
/// workspace.
#[derive(Debug, Clone, Default)]
pub struct HarnessRequest {
    /// Absolute path of the test plan on the host.
    pub test_plan: PathBuf,
    /// Bundle file to select within a multi-bundle source.
    pub bundle_file: Option<String>,
    /// Directory results are mirrored into afterwards.
    pub log_dir: Option<PathBuf>,
    /// Entries skipped when mirroring.
    pub results_ignore: Vec<String>,
}

/// A host/container bind mount pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMount {
    /// Host path.
    pub host: PathBuf,
    /// Container path.
    pub container: PathBuf,
}

impl BindMount {
    fn new(host: impl Into<PathBuf>, container: impl Into<PathBuf>) -> Self {
        Self {
            host: host.into(),
            container: container.into(),
        }
    }

    fn to_volume_arg(&self) -> String {
        format!("{}:{}", self.host.display(), self.container.display())
    }
}

/// Runs the containerized test harness against live environments.
pub struct ContainerRunner<'a> {
    runner: &'a dyn CommandRunner,
    host: &'a HostLayout,
    container: &'a ContainerLayout,
}

impl<'a> ContainerRunner<'a> {
    /// Binds a runner to one workspace.
    #[must_use]
    pub const fn new(
        runner: &'a dyn CommandRunner,
        host: &'a HostLayout,
        container: &'a ContainerLayout,
    ) -> Self {
        Self {
            runner,
            host,
            container,
        }
    }

    /// Pulls the image, runs the harness to completion, then mirrors the
    /// results into `request.log_dir` when one is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the test plan path has no file name, the pull or
    /// the run exits non-zero, or mirroring fails.
    pub fn run(&self, request: &HarnessRequest) -> Result<()> {
        tracing::debug!(host = ?self.host, container = ?self.container, "starting harness");
        self.runner
            .run(&argv!["sudo", "docker", "pull", self.container.image])?;

        let command = self.docker_run_command(request)?;
        self.runner.run(&command)?;
        tracing::info!(
            uid = nix::unistd::geteuid().as_raw(),
            gid = nix::unistd::getegid().as_raw(),
            "harness finished"
        );

        if let Some(log_dir) = &request.log_dir {
            self.mirror_results(log_dir, &request.results_ignore)?;
        }
        Ok(())
    }

    /// Bind mounts in the order they are passed to `docker run`.
    ///
    /// # Errors
    ///
    /// Returns an error if the test plan has no parent directory.
    pub fn mounts(&self, test_plan: &Path) -> Result<Vec<BindMount>> {
        let plan_dir = test_plan.parent().ok_or_else(|| BuildcloudError::Config {
            message: format!("test plan {} has no parent directory", test_plan.display()),
        })?;
        let (host, container) = (self.host, self.container);
        Ok(vec![
            BindMount::new(&host.results, &container.results),
            BindMount::new(&host.juju_home, &container.juju_home),
            BindMount::new(host.deployer_cache(), container.deployer_cache()),
            BindMount::new(&host.repository, &container.repository),
            BindMount::new(&host.tmp, &host.tmp),
            BindMount::new(plan_dir, &container.test_plans),
            BindMount::new(&host.ssh, &container.ssh_home),
        ])
    }

    /// Full `docker run` argument vector, ending with the harness shell line.
    ///
    /// # Errors
    ///
    /// Returns an error if the test plan path has no file name or parent.
    pub fn docker_run_command(&self, request: &HarnessRequest) -> Result<Vec<String>> {
        let c = self.container;
        let mut command = argv![
            "sudo",
            "docker",
            "run",
            "--rm",
            "-u",
            c.user,
            "-e",
            format!("HOME={}", c.home.display()),
            "-e",
            format!("JUJU_HOME={}", c.juju_home.display()),
            "-w",
            c.home.display(),
        ];
        for mount in self.mounts(&request.test_plan)? {
            command.push("-v".to_string());
            command.push(mount.to_volume_arg());
        }
        command.extend(argv!["-t", c.image, "sh", "-c"]);
        command.push(self.harness_command(request)?);
        Ok(command)
    }

    /// The harness invocation run by `sh -c` inside the container.
    ///
    /// # Errors
    ///
    /// Returns an error if the test plan path has no file name.
    pub fn harness_command(&self, request: &HarnessRequest) -> Result<String> {
        let plan_name = request.test_plan.file_name().ok_or_else(|| BuildcloudError::Config {
            message: format!("test plan {} has no file name", request.test_plan.display()),
        })?;
        let in_container_plan = self.container.test_plans.join(plan_name);

        let mut parts = vec!["sudo cwr -F -l DEBUG -v".to_string()];
        if let Some(bundle) = request.bundle_file.as_deref().filter(|b| !b.is_empty()) {
            parts.push(format!("--bundle {bundle}"));
        }
        parts.push(self.host.environment_names().join(" "));
        parts.push(in_container_plan.display().to_string());
        Ok(parts.join(" "))
    }

    fn mirror_results(&self, log_dir: &Path, ignore: &[String]) -> Result<()> {
        std::fs::create_dir_all(log_dir).map_err(|e| BuildcloudError::io(log_dir, e))?;
        let patterns: Vec<&str> = ignore.iter().map(String::as_str).collect();
        copy_tree(&self.host.results, log_dir, &patterns)?;
        tracing::info!(dest = %log_dir.display(), "mirrored results");
        Ok(())
    }
}
