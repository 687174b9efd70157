//! Unified error type for the buildcloud workspace.
//!
//! Library code returns [`Result`]; the binary wraps it in `anyhow` at the
//! top level.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum BuildcloudError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value or input file is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A requested environment is absent from the environments document.
    #[error("environment '{name}' not found in {path}")]
    EnvironmentNotFound {
        /// Caller-given environment name.
        name: String,
        /// Environments document that was searched.
        path: PathBuf,
    },

    /// A required external tool is not installed.
    #[error("required tool not found on PATH: {tool}")]
    ToolMissing {
        /// Program name that could not be resolved.
        tool: String,
    },

    /// A command could not be spawned.
    #[error("failed to execute `{command}`: {source}")]
    Spawn {
        /// Rendered command line.
        command: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A command ran and exited unsuccessfully.
    #[error("command `{command}` failed with {}", exit_label(.code))]
    CommandFailed {
        /// Rendered command line.
        command: String,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
    },

    /// The operator interrupted the run before it finished bringing
    /// environments up.
    #[error("run interrupted")]
    Interrupted,

    /// YAML parsing or serialization failed.
    #[error("YAML error: {source}")]
    Yaml {
        /// Underlying YAML error.
        #[from]
        source: serde_yaml::Error,
    },
}

impl BuildcloudError {
    /// Builds an [`BuildcloudError::Io`] for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns whether this error came from an external process that could
    /// not be run or exited non-zero.
    #[must_use]
    pub const fn is_command_failure(&self) -> bool {
        matches!(
            self,
            Self::CommandFailed { .. } | Self::Spawn { .. } | Self::ToolMissing { .. }
        )
    }
}

#[allow(clippy::ref_option)]
fn exit_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "termination by signal".to_string(), |c| format!("exit code {c}"))
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, BuildcloudError>;
