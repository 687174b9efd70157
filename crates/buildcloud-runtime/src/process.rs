//! Blocking subprocess execution.
//!
//! All external tools (`juju`, `docker`, `sudo`) are invoked through the
//! [`CommandRunner`] trait so the orchestration code can be driven by a
//! fake in tests.

use std::process::{Command, Stdio};

use buildcloud_common::error::{BuildcloudError, Result};

/// Executes external commands given as argument vectors.
pub trait CommandRunner {
    /// Runs a command to completion with inherited stdio.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be started or exits non-zero.
    fn run(&self, argv: &[String]) -> Result<()>;

    /// Runs a command to completion and returns its standard output.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be started or exits non-zero.
    fn output(&self, argv: &[String]) -> Result<String>;
}

/// Runs commands on the host with [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner {
    verbose: bool,
}

impl SystemRunner {
    /// Creates a runner. A verbose runner echoes every command at `info`.
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn prepare(&self, argv: &[String]) -> Result<Command> {
        let (program, args) = argv.split_first().ok_or_else(|| BuildcloudError::Config {
            message: "command is empty".into(),
        })?;
        let resolved = which::which(program).map_err(|_| BuildcloudError::ToolMissing {
            tool: program.clone(),
        })?;

        let rendered = render(argv);
        if self.verbose {
            tracing::info!(cmd = %rendered, "executing");
        } else {
            tracing::debug!(cmd = %rendered, "executing");
        }

        let mut command = Command::new(resolved);
        let _ = command.args(args);
        Ok(command)
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[String]) -> Result<()> {
        let mut command = self.prepare(argv)?;
        let status = command
            .stdin(Stdio::null())
            .status()
            .map_err(|e| BuildcloudError::Spawn {
                command: render(argv),
                source: e,
            })?;
        if !status.success() {
            return Err(BuildcloudError::CommandFailed {
                command: render(argv),
                code: status.code(),
            });
        }
        Ok(())
    }

    fn output(&self, argv: &[String]) -> Result<String> {
        let mut command = self.prepare(argv)?;
        let output = command
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| BuildcloudError::Spawn {
                command: render(argv),
                source: e,
            })?;
        if !output.status.success() {
            return Err(BuildcloudError::CommandFailed {
                command: render(argv),
                code: output.status.code(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Renders an argument vector as a single space-joined line for logs and
/// error messages.
#[must_use]
pub fn render(argv: &[String]) -> String {
    argv.join(" ")
}

/// Builds an owned argument vector from string-like parts.
#[macro_export]
macro_rules! argv {
    ($($arg:expr),* $(,)?) => {
        vec![$(::std::string::ToString::to_string(&$arg)),*]
    };
}
