//! Fixed names, paths and defaults.

/// Environment variable redirecting the orchestration tool's home.
pub const JUJU_HOME_VAR: &str = "JUJU_HOME";

/// Home directory name used when `JUJU_HOME` is unset.
pub const DEFAULT_JUJU_HOME_DIR: &str = ".juju";

/// Orchestration tool binary.
pub const JUJU_BIN: &str = "juju";

/// Environments document inside a credential home.
pub const ENVIRONMENTS_FILE: &str = "environments.yaml";

/// Top-level key of the environments document.
pub const ENVIRONMENTS_KEY: &str = "environments";

/// Live environment state directory excluded when duplicating a credential home.
pub const LIVE_STATE_ENTRY: &str = "environments";

/// Prefix applied to every environment name for the duration of a run.
pub const DEFAULT_ENV_PREFIX: &str = "cwr-";

/// Private key copied out of the credential home.
pub const DEFAULT_SSH_KEY_SOURCE: &str = "staging-juju-rsa";

/// Name the private key is installed under.
pub const SSH_KEY_NAME: &str = "id_rsa";

/// Prefix of the per-run root directory.
pub const RUN_ROOT_PREFIX: &str = "buildcloud-";

/// Duplicated credential home, under the run root.
pub const HOST_JUJU_HOME_DIR: &str = "tmp_juju_home";
/// Shared dependency cache directory.
pub const HOST_REPOSITORY_DIR: &str = "juju_repository";
/// Results directory.
pub const HOST_RESULTS_DIR: &str = "results";
/// Scratch directory.
pub const HOST_TMP_DIR: &str = "tmp";
/// SSH material directory, under the scratch directory.
pub const HOST_SSH_DIR: &str = "ssh";

/// Deployer cache directory, relative to both the scratch dir and the
/// container's credential home.
pub const DEPLOYER_CACHE_DIR: &str = ".deployer-store-cache";

/// Test harness image.
pub const DEFAULT_CONTAINER_IMAGE: &str = "seman/cwrbox";

/// Non-root user the harness runs as.
pub const DEFAULT_CONTAINER_USER: &str = "ubuntu";

/// Bootstrap-time constraint.
pub const DEFAULT_BOOTSTRAP_CONSTRAINTS: &str = "mem=4G";

/// Constraint applied once an environment is live.
pub const DEFAULT_STEADY_CONSTRAINTS: &str = "mem=2G";

/// Effective group id identifying the CI service account.
pub const CI_GROUP_ID: u32 = 111;

/// Owner applied to the run root when running as the CI service account.
pub const CI_OWNER: &str = "jenkins:jenkins";

/// Log paths fetched from every machine of every environment.
pub const REMOTE_LOG_PATTERNS: [&str; 3] = [
    "/var/log/cloud-init*.log",
    "/var/log/juju/*.log",
    "/var/log/syslog",
];

/// Entries skipped when mirroring results into the caller's log directory.
pub const RESULTS_IGNORE_PATTERNS: [&str; 2] = ["static", "*.html"];

/// Binary name for the CLI.
pub const BIN_NAME: &str = "build-cloud";
