//! Remote log retrieval from every machine of every environment.
//!
//! Collection is diagnostic only. A failing status query or copy is logged
//! and the remaining environments, machines and paths are still attempted.

use std::path::{Path, PathBuf};

use buildcloud_common::error::{BuildcloudError, Result};

use crate::juju::Juju;
use crate::process::CommandRunner;
use crate::status::parse_machines;

/// Log patterns and destination for one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogManifest {
    /// Run-scoped environment name.
    pub environment: String,
    /// Machines reported live at collection time.
    pub machines: Vec<String>,
    /// Remote glob patterns fetched from each machine.
    pub patterns: Vec<String>,
    /// Local directory the logs land in.
    pub destination: PathBuf,
}

/// Outcome counts of one collection pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionReport {
    /// Machine/pattern pairs copied successfully.
    pub copied: usize,
    /// Status queries, permission changes and copies that failed.
    pub failed: usize,
}

/// Pulls a fixed set of log paths from each machine.
pub struct LogCollector<'a> {
    juju: Juju<'a>,
    patterns: &'a [String],
}

impl<'a> LogCollector<'a> {
    /// Creates a collector fetching `patterns` from each machine.
    #[must_use]
    pub const fn new(runner: &'a dyn CommandRunner, patterns: &'a [String]) -> Self {
        Self {
            juju: Juju::new(runner),
            patterns,
        }
    }

    /// Collects logs for each environment into `log_dir/<environment>`.
    ///
    /// Never fails: every problem is logged and counted in the report.
    pub fn collect_all(&self, environments: &[&str], log_dir: &Path) -> CollectionReport {
        tracing::info!(dest = %log_dir.display(), "gathering remote logs");
        let mut report = CollectionReport::default();
        for env in environments {
            match self.manifest(env, log_dir) {
                Ok(manifest) => self.fetch(&manifest, &mut report),
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(env, error = %e, "could not list machines for log collection");
                }
            }
        }
        report
    }

    /// Creates the destination directory and reads the live machine list.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the status
    /// query fails.
    pub fn manifest(&self, environment: &str, log_dir: &Path) -> Result<LogManifest> {
        let destination = log_dir.join(environment);
        std::fs::create_dir_all(&destination)
            .map_err(|e| BuildcloudError::io(&destination, e))?;
        let machines = parse_machines(&self.juju.status(environment)?)?;
        Ok(LogManifest {
            environment: environment.to_string(),
            machines,
            patterns: self.patterns.to_vec(),
            destination,
        })
    }

    fn fetch(&self, manifest: &LogManifest, report: &mut CollectionReport) {
        let env = manifest.environment.as_str();
        for machine in &manifest.machines {
            for pattern in &manifest.patterns {
                // Files may already be readable, so a failed chmod still copies.
                if let Err(e) = self
                    .juju
                    .ssh(env, machine, &["sudo", "chmod", "-Rf", "go+r", pattern.as_str()])
                {
                    report.failed += 1;
                    tracing::warn!(env, machine, pattern, error = %e, "could not relax log permissions");
                }
                match self.juju.scp_from(env, machine, pattern, &manifest.destination) {
                    Ok(()) => report.copied += 1,
                    Err(e) => {
                        report.failed += 1;
                        tracing::warn!(env, machine, pattern, error = %e, "log retrieval failed");
                    }
                }
            }
        }
    }
}
