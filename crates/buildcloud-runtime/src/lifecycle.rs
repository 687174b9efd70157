//! Bring-up, workload and guaranteed teardown of a run's environments.
//!
//! Order of operations:
//! 1. `juju --version` must succeed, otherwise nothing is created.
//! 2. Each environment is bootstrapped with the generous constraint, then
//!    narrowed to the steady-state constraint. The first failure stops
//!    bring-up. A raised interrupt flag stops bring-up before the next
//!    bootstrap and before the workload.
//! 3. The workload runs while every environment is live.
//! 4. Teardown always runs for the environments whose bootstrap succeeded:
//!    ownership normalization, log collection, then one destroy attempt per
//!    environment. The first destroy failure is returned after all attempts.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use buildcloud_common::config::BuildcloudConfig;
use buildcloud_common::error::{BuildcloudError, Result};
use buildcloud_common::types::Ownership;

use crate::juju::Juju;
use crate::logs::LogCollector;
use crate::ownership;
use crate::process::CommandRunner;
use crate::workspace::HostLayout;

/// Scoped owner of a run's live environments.
pub struct EnvironmentLifecycle<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a BuildcloudConfig,
    host: &'a HostLayout,
    log_dir: Option<&'a Path>,
    owner: Ownership,
    interrupted: Option<&'a AtomicBool>,
}

impl<'a> EnvironmentLifecycle<'a> {
    /// Creates a lifecycle for the environments in `host`, owning the run
    /// root as the detected invoking user.
    #[must_use]
    pub fn new(
        runner: &'a dyn CommandRunner,
        config: &'a BuildcloudConfig,
        host: &'a HostLayout,
    ) -> Self {
        Self {
            runner,
            config,
            host,
            log_dir: None,
            owner: ownership::detect_owner(config),
            interrupted: None,
        }
    }

    /// Collects remote logs into `log_dir` during teardown.
    #[must_use]
    pub fn log_dir(mut self, log_dir: Option<&'a Path>) -> Self {
        self.log_dir = log_dir;
        self
    }

    /// Overrides the owner the run root is normalized to.
    #[must_use]
    pub fn owner(mut self, owner: Ownership) -> Self {
        self.owner = owner;
        self
    }

    /// Stops bring-up once `flag` is set, e.g. by a Ctrl+C handler.
    #[must_use]
    pub fn interrupt_flag(mut self, flag: &'a AtomicBool) -> Self {
        self.interrupted = Some(flag);
        self
    }

    /// Brings every environment up, runs `workload`, and tears everything
    /// down again.
    ///
    /// # Errors
    ///
    /// Returns the precondition failure, else the first teardown (destroy)
    /// failure, else the bootstrap, interrupt or workload failure.
    pub fn run<T>(&self, workload: impl FnOnce() -> Result<T>) -> Result<T> {
        if self.host.environments.is_empty() {
            return Err(BuildcloudError::Config {
                message: "no environments to bring up".into(),
            });
        }
        let juju = Juju::new(self.runner);
        let version = juju.version()?;
        tracing::info!(
            %version,
            juju_home = %self.host.juju_home.display(),
            "orchestration tool ready"
        );

        let mut scope = TeardownScope::new(self);
        let outcome = self
            .bootstrap_all(&juju, &mut scope)
            .and_then(|()| self.check_interrupt())
            .and_then(|()| workload());
        let teardown = scope.finish();

        match (outcome, teardown) {
            (Ok(value), Ok(())) => Ok(value),
            (Err(e), Ok(())) => Err(e),
            (Ok(_), Err(teardown_err)) => Err(teardown_err),
            (Err(e), Err(teardown_err)) => {
                tracing::error!(error = %e, "run failed before teardown; reporting teardown failure");
                Err(teardown_err)
            }
        }
    }

    fn bootstrap_all(&self, juju: &Juju<'_>, scope: &mut TeardownScope<'_, '_>) -> Result<()> {
        for env in self.host.environment_names() {
            self.check_interrupt()?;
            tracing::info!(env, constraints = %self.config.bootstrap_constraints, "bootstrapping");
            juju.bootstrap(env, &self.config.bootstrap_constraints)?;
            scope.live.push(env.to_string());
            juju.set_constraints(env, &self.config.steady_constraints)?;
        }
        Ok(())
    }

    fn check_interrupt(&self) -> Result<()> {
        if self.interrupted.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
            tracing::warn!("interrupted; skipping remaining bring-up");
            return Err(BuildcloudError::Interrupted);
        }
        Ok(())
    }

    /// Runs the teardown sequence for `live` environments.
    ///
    /// Ownership normalization and log collection are best-effort; every
    /// environment gets exactly one destroy attempt.
    ///
    /// # Errors
    ///
    /// Returns the first destroy failure, in `live` order.
    pub fn teardown(&self, live: &[String]) -> Result<()> {
        tracing::info!(environments = ?live, "tearing down");
        if let Err(e) = ownership::normalize(self.runner, &self.owner, &self.host.root) {
            tracing::warn!(error = %e, "ownership normalization failed");
        }

        let names: Vec<&str> = live.iter().map(String::as_str).collect();
        match self.log_dir {
            Some(dir) if !names.is_empty() => {
                let report =
                    LogCollector::new(self.runner, &self.config.remote_logs).collect_all(&names, dir);
                tracing::info!(copied = report.copied, failed = report.failed, "remote logs gathered");
            }
            Some(_) => {}
            None => tracing::info!("no log directory given; skipping remote log collection"),
        }

        destroy_all(&Juju::new(self.runner), &names)
    }
}

/// Destroys every environment in order, continuing past failures.
///
/// # Errors
///
/// Returns the first failure after all destroys have been attempted.
pub fn destroy_all(juju: &Juju<'_>, environments: &[&str]) -> Result<()> {
    let mut first_error = None;
    for env in environments {
        if let Err(e) = juju.destroy(env) {
            tracing::error!(env, error = %e, "destroy environment failed");
            if first_error.is_none() {
                first_error = Some(e);
            }
        } else {
            tracing::info!(env, "environment destroyed");
        }
    }
    first_error.map_or(Ok(()), Err)
}

/// Tracks bootstrapped environments and tears them down exactly once,
/// either through [`TeardownScope::finish`] or, if the stack unwinds first,
/// on drop.
struct TeardownScope<'l, 'a> {
    lifecycle: &'l EnvironmentLifecycle<'a>,
    live: Vec<String>,
    done: bool,
}

impl<'l, 'a> TeardownScope<'l, 'a> {
    const fn new(lifecycle: &'l EnvironmentLifecycle<'a>) -> Self {
        Self {
            lifecycle,
            live: Vec::new(),
            done: false,
        }
    }

    fn finish(mut self) -> Result<()> {
        self.done = true;
        self.lifecycle.teardown(&self.live)
    }
}

impl Drop for TeardownScope<'_, '_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Err(e) = self.lifecycle.teardown(&self.live) {
            tracing::error!(error = %e, "teardown during unwind failed");
        }
    }
}
