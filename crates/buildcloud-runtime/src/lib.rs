//! Environment lifecycle orchestration for buildcloud.
//!
//! A run flows through four pieces:
//! - [`workspace::EnvironmentBuilder`] lays out an isolated run root and
//!   renames the requested environments.
//! - [`lifecycle::EnvironmentLifecycle`] bootstraps them, runs one workload
//!   and always tears them down.
//! - [`container::ContainerRunner`] is that workload: the harness container.
//! - [`logs::LogCollector`] pulls machine logs during teardown.
//!
//! Every external command goes through [`process::CommandRunner`].

#![allow(unsafe_code)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod container;
pub mod environments;
pub mod fsutil;
pub mod juju;
pub mod juju_home;
pub mod lifecycle;
pub mod logs;
pub mod ownership;
pub mod process;
pub mod status;
pub mod workspace;
