//! # buildcloud-common
//!
//! Shared error definitions, constants, domain types and the configuration
//! model used across the buildcloud workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
