//! Command-line arguments.

use std::path::PathBuf;

use buildcloud_common::constants::BIN_NAME;
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

/// Provision test environments, run the test harness, tear everything down.
#[derive(Parser, Debug)]
#[command(name = BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Names of the environments to use.
    #[arg(required = true, num_args = 1..)]
    pub models: Vec<String>,

    /// File path to the test plan.
    pub test_plan: PathBuf,

    /// Bundle file to deploy when the source holds several bundle files.
    #[arg(long)]
    pub bundle_file: Option<String>,

    /// Raise log verbosity (repeatable).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Juju home directory. Defaults to $JUJU_HOME, then ~/.juju.
    #[arg(long)]
    pub juju_home: Option<PathBuf>,

    /// Directory to dump remote logs and test results to.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// YAML file overriding run defaults (prefix, image, constraints, ...).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Default log level for the requested verbosity: warn, info, then debug.
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    /// Log filter honoring `RUST_LOG` first, then `--verbose`.
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.log_level()))
    }
}
