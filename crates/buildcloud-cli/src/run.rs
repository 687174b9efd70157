//! Composition of a full run: workspace, JUJU_HOME override, lifecycle and
//! harness container.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use buildcloud_common::config::BuildcloudConfig;
use buildcloud_runtime::container::{ContainerRunner, HarnessRequest};
use buildcloud_runtime::juju_home::{default_juju_home, with_juju_home};
use buildcloud_runtime::lifecycle::EnvironmentLifecycle;
use buildcloud_runtime::process::SystemRunner;
use buildcloud_runtime::workspace::EnvironmentBuilder;

use crate::cli::Cli;

/// Executes one run end to end.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the workspace cannot be
/// built, or any bootstrap, harness run or destroy fails.
pub fn execute(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => BuildcloudConfig::load(path)?,
        None => BuildcloudConfig::default(),
    };
    let test_plan = resolve_test_plan(&cli.test_plan)?;
    let juju_home = cli.juju_home.clone().unwrap_or_else(default_juju_home);

    let workspace = EnvironmentBuilder::new(&config)
        .build(&juju_home, &cli.models)
        .with_context(|| format!("preparing run workspace from {}", juju_home.display()))?;

    // Until here Ctrl+C keeps its default behaviour and simply ends the run.
    let interrupted = install_interrupt_handler()?;
    let runner = SystemRunner::new(cli.verbose > 0);
    let request = HarnessRequest {
        test_plan,
        bundle_file: cli.bundle_file.clone(),
        log_dir: cli.log_dir.clone(),
        results_ignore: config.results_ignore.clone(),
    };

    with_juju_home(&workspace.host.juju_home, || {
        EnvironmentLifecycle::new(&runner, &config, &workspace.host)
            .log_dir(cli.log_dir.as_deref())
            .interrupt_flag(&interrupted)
            .run(|| {
                ContainerRunner::new(&runner, &workspace.host, &workspace.container).run(&request)
            })
    })?;

    tracing::info!("run completed");
    Ok(())
}

fn resolve_test_plan(path: &Path) -> anyhow::Result<PathBuf> {
    let absolute = std::path::absolute(path)
        .with_context(|| format!("resolving test plan path {}", path.display()))?;
    if !absolute.is_file() {
        anyhow::bail!("test plan not found: {}", absolute.display());
    }
    Ok(absolute)
}

/// Routes Ctrl+C into a flag the lifecycle polls between steps. The
/// interrupted child exits non-zero, no further environment is bootstrapped,
/// and teardown still runs.
fn install_interrupt_handler() -> anyhow::Result<Arc<AtomicBool>> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        tracing::warn!("interrupt received; tearing down once the current command exits");
    })
    .context("failed to set Ctrl+C handler")?;
    Ok(interrupted)
}
