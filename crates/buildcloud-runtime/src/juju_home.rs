//! Scoped redirection of the orchestration tool's configuration home.
//!
//! `juju` reads `JUJU_HOME` to find its credentials. A run points it at the
//! run-local copy for its whole duration and puts the previous value back
//! afterwards, whatever way the scope is left.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use buildcloud_common::constants::{DEFAULT_JUJU_HOME_DIR, JUJU_HOME_VAR};

/// Returns the credential home to use when none is given: `$JUJU_HOME`, or
/// `$HOME/.juju` when that is unset or empty.
#[must_use]
pub fn default_juju_home() -> PathBuf {
    match std::env::var_os(JUJU_HOME_VAR) {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => {
            let home = std::env::var_os("HOME").unwrap_or_else(|| OsString::from("."));
            PathBuf::from(home).join(DEFAULT_JUJU_HOME_DIR)
        }
    }
}

/// Holds `JUJU_HOME` at a given path until dropped.
///
/// On drop the variable is restored to its exact prior value, or removed if
/// it was previously unset.
#[derive(Debug)]
#[must_use = "JUJU_HOME is restored as soon as the guard is dropped"]
pub struct JujuHomeGuard {
    previous: Option<OsString>,
}

impl JujuHomeGuard {
    /// Points `JUJU_HOME` at `path`, remembering the current value.
    pub fn set(path: &Path) -> Self {
        let previous = std::env::var_os(JUJU_HOME_VAR);
        // SAFETY: the only other thread is the Ctrl+C handler, which never
        // reads or writes the process environment.
        unsafe { std::env::set_var(JUJU_HOME_VAR, path) };
        tracing::info!(path = %path.display(), "JUJU_HOME redirected");
        Self { previous }
    }
}

impl Drop for JujuHomeGuard {
    fn drop(&mut self) {
        // SAFETY: see `JujuHomeGuard::set`.
        match self.previous.take() {
            Some(value) => unsafe { std::env::set_var(JUJU_HOME_VAR, value) },
            None => unsafe { std::env::remove_var(JUJU_HOME_VAR) },
        }
        tracing::debug!("JUJU_HOME restored");
    }
}

/// Runs `f` with `JUJU_HOME` pointing at `path`.
pub fn with_juju_home<T>(path: &Path, f: impl FnOnce() -> T) -> T {
    let _guard = JujuHomeGuard::set(path);
    f()
}
