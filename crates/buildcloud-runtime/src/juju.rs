//! Command lines for the `juju` orchestration tool.

use std::path::Path;

use buildcloud_common::constants::JUJU_BIN;
use buildcloud_common::error::Result;

use crate::argv;
use crate::process::CommandRunner;

/// Thin typed facade over the `juju` subcommands a run needs.
pub struct Juju<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Juju<'a> {
    /// Wraps a command runner.
    #[must_use]
    pub const fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Returns the tool's reported version.
    ///
    /// # Errors
    ///
    /// Returns an error if `juju` is not installed or cannot report a version.
    pub fn version(&self) -> Result<String> {
        let out = self.runner.output(&argv![JUJU_BIN, "--version"])?;
        Ok(out.trim().to_string())
    }

    /// Bootstraps `env` under the given constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if the bootstrap command fails.
    pub fn bootstrap(&self, env: &str, constraints: &str) -> Result<()> {
        self.runner.run(&argv![
            JUJU_BIN,
            "bootstrap",
            "--show-log",
            "-e",
            env,
            "--constraints",
            constraints
        ])
    }

    /// Replaces the environment-wide constraints of a live environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub fn set_constraints(&self, env: &str, constraints: &str) -> Result<()> {
        self.runner
            .run(&argv![JUJU_BIN, "set-constraints", "-e", env, constraints])
    }

    /// Forcibly destroys `env` without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub fn destroy(&self, env: &str) -> Result<()> {
        self.runner.run(&argv![
            JUJU_BIN,
            "destroy-environment",
            "--force",
            "--yes",
            env
        ])
    }

    /// Returns the raw YAML status of `env`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub fn status(&self, env: &str) -> Result<String> {
        self.runner
            .output(&argv![JUJU_BIN, "status", "-e", env, "--format", "yaml"])
    }

    /// Runs `remote` on `machine` over ssh.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub fn ssh(&self, env: &str, machine: &str, remote: &[&str]) -> Result<()> {
        let mut command = argv![JUJU_BIN, "ssh", "-e", env, machine];
        command.extend(remote.iter().map(ToString::to_string));
        self.runner.run(&command)
    }

    /// Recursively copies `remote_path` from `machine` into `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub fn scp_from(&self, env: &str, machine: &str, remote_path: &str, dest: &Path) -> Result<()> {
        self.runner.run(&argv![
            JUJU_BIN,
            "scp",
            "-e",
            env,
            "--",
            "-rC",
            format!("{machine}:{remote_path}"),
            dest.display()
        ])
    }
}
