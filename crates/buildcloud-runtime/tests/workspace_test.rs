//! Run workspace construction by `EnvironmentBuilder`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use buildcloud_common::config::BuildcloudConfig;
use buildcloud_common::error::BuildcloudError;
use buildcloud_runtime::workspace::EnvironmentBuilder;
use serde_yaml::Value;

const ENVIRONMENTS: &str = "\
default: aws
environments:
  aws:
    type: ec2
    access-key: k
  gce:
    type: gce
  maas:
    type: maas
";

fn juju_home() -> tempfile::TempDir {
    let home = tempfile::tempdir().expect("tempdir");
    std::fs::write(home.path().join("environments.yaml"), ENVIRONMENTS).expect("write doc");
    std::fs::write(home.path().join("staging-juju-rsa"), "PRIVATE KEY").expect("write key");
    std::fs::create_dir(home.path().join("environments")).expect("mkdir live state");
    std::fs::write(home.path().join("environments/aws.jenv"), "live").expect("write jenv");
    std::fs::create_dir(home.path().join("ssh")).expect("mkdir ssh");
    std::fs::write(home.path().join("ssh/juju_id_rsa"), "k").expect("write");
    home
}

fn read_yaml(path: &Path) -> Value {
    serde_yaml::from_str(&std::fs::read_to_string(path).expect("read")).expect("parse")
}

fn entries(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .expect("read_dir")
        .map(|e| e.expect("entry").path())
        .collect()
}

#[test]
fn builds_layout_under_a_fresh_root() {
    let home = juju_home();
    let parent = tempfile::tempdir().expect("parent");
    let config = BuildcloudConfig::default();

    let workspace = EnvironmentBuilder::new(&config)
        .temp_parent(parent.path())
        .build(home.path(), &["aws".into(), "gce".into()])
        .expect("build");
    let host = &workspace.host;

    assert!(host.root.starts_with(parent.path()));
    assert_eq!(workspace.root(), host.root.as_path());
    for dir in [&host.juju_home, &host.repository, &host.results, &host.tmp, &host.ssh] {
        assert!(dir.is_dir(), "{} should exist", dir.display());
    }
    assert_eq!(host.ssh, host.tmp.join("ssh"));
    assert_eq!(
        std::fs::read_to_string(host.ssh.join("id_rsa")).expect("key"),
        "PRIVATE KEY"
    );
    assert_eq!(host.environment_names(), vec!["cwr-aws", "cwr-gce"]);
    assert_eq!(host.environments[0].original(), "aws");
    assert_eq!(workspace.container.user, "ubuntu");
    assert_eq!(workspace.container.image, "seman/cwrbox");
}

#[test]
fn duplicate_excludes_live_environment_state() {
    let home = juju_home();
    let config = BuildcloudConfig::default();

    let workspace = EnvironmentBuilder::new(&config)
        .build(home.path(), &["aws".into()])
        .expect("build");

    assert!(!workspace.host.juju_home.join("environments").exists());
    assert!(workspace.host.juju_home.join("environments.yaml").exists());
    assert!(workspace.host.juju_home.join("ssh/juju_id_rsa").exists());
}

#[test]
fn renames_only_requested_environments_in_the_copy() {
    let home = juju_home();
    let config = BuildcloudConfig::default();

    let workspace = EnvironmentBuilder::new(&config)
        .build(home.path(), &["aws".into(), "gce".into()])
        .expect("build");

    let doc = read_yaml(&workspace.host.juju_home.join("environments.yaml"));
    let envs = doc["environments"].as_mapping().expect("mapping");
    assert_eq!(envs.len(), 3);
    assert!(envs.contains_key("cwr-aws"));
    assert!(envs.contains_key("cwr-gce"));
    assert!(envs.contains_key("maas"));
    assert!(!envs.contains_key("aws"));
    assert_eq!(doc["environments"]["cwr-aws"]["access-key"], Value::String("k".into()));
    assert_eq!(doc["default"], Value::String("aws".into()));
    assert_eq!(
        std::fs::read_to_string(workspace.host.juju_home.join("environments.yaml")).expect("read"),
        ENVIRONMENTS
            .replace("\n  aws:\n", "\n  cwr-aws:\n")
            .replace("\n  gce:\n", "\n  cwr-gce:\n")
    );

    // the caller's document is untouched
    assert_eq!(
        std::fs::read_to_string(home.path().join("environments.yaml")).expect("read"),
        ENVIRONMENTS
    );
}

#[test]
fn custom_prefix_is_applied() {
    let home = juju_home();
    let config = BuildcloudConfig {
        env_prefix: "ci-42-".into(),
        ..BuildcloudConfig::default()
    };

    let workspace = EnvironmentBuilder::new(&config)
        .build(home.path(), &["maas".into()])
        .expect("build");

    assert_eq!(workspace.host.environment_names(), vec!["ci-42-maas"]);
}

#[test]
fn root_is_removed_when_workspace_is_dropped() {
    let home = juju_home();
    let config = BuildcloudConfig::default();

    let workspace = EnvironmentBuilder::new(&config)
        .build(home.path(), &["aws".into()])
        .expect("build");
    let root = workspace.host.root.clone();
    assert!(root.is_dir());

    drop(workspace);
    assert!(!root.exists());
}

#[test]
fn unknown_environment_fails_and_leaves_no_root_behind() {
    let home = juju_home();
    let parent = tempfile::tempdir().expect("parent");
    let config = BuildcloudConfig::default();

    let err = EnvironmentBuilder::new(&config)
        .temp_parent(parent.path())
        .build(home.path(), &["aws".into(), "azure".into()])
        .unwrap_err();

    assert!(matches!(err, BuildcloudError::EnvironmentNotFound { ref name, .. } if name == "azure"));
    assert!(entries(parent.path()).is_empty());
}

#[test]
fn missing_ssh_key_is_an_io_error() {
    let home = juju_home();
    std::fs::remove_file(home.path().join("staging-juju-rsa")).expect("remove key");
    let config = BuildcloudConfig::default();

    let err = EnvironmentBuilder::new(&config)
        .build(home.path(), &["aws".into()])
        .unwrap_err();

    assert!(matches!(err, BuildcloudError::Io { .. }));
}
