//! Ownership normalization of the run root.
//!
//! The harness container writes into bind-mounted host directories as its
//! own user. Before teardown reads those trees back, the whole root is
//! handed to whoever runs the orchestrator.

use std::path::Path;

use buildcloud_common::config::BuildcloudConfig;
use buildcloud_common::error::Result;
use buildcloud_common::types::Ownership;
use nix::unistd::{getegid, geteuid};

use crate::argv;
use crate::process::CommandRunner;

/// Picks the owner for the run root: the CI service account when the
/// effective gid identifies it, otherwise the invoking user's ids.
#[must_use]
pub fn detect_owner(config: &BuildcloudConfig) -> Ownership {
    owner_for(config, geteuid().as_raw(), getegid().as_raw())
}

fn owner_for(config: &BuildcloudConfig, uid: u32, gid: u32) -> Ownership {
    if gid == config.ci_group_id {
        Ownership::Named(config.ci_owner.clone())
    } else {
        Ownership::Ids { uid, gid }
    }
}

/// Recursively chowns `root` to `owner` with `sudo`.
///
/// # Errors
///
/// Returns an error if the `chown` command fails.
pub fn normalize(runner: &dyn CommandRunner, owner: &Ownership, root: &Path) -> Result<()> {
    tracing::info!(%owner, root = %root.display(), "normalizing ownership");
    runner.run(&argv!["sudo", "chown", "-R", owner, root.display()])
}
