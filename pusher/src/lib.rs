//! toitnups pusher library.
//!
//! This crate provides the integration registry, the .NET build and artifact
//! collection steps, and the publish pipeline that copies assemblies into a
//! Unity project and keeps its `link.xml` current. It is used by the
//! `toitnups` CLI binary and can be driven programmatically in tests.
//!
//! # Modules
//!
//! - [`builder`] - .NET build and scaffolding behind the `BuildInvoker` trait
//! - [`cli`] - Command-line argument definitions
//! - [`collector`] - Artifact discovery and exclusion rules
//! - [`commands`] - Subcommand implementations
//! - [`config`] - Project configuration from `toitnups.toml`
//! - [`error`] - Semantic error types with recovery hints
//! - [`executor`] - External command execution
//! - [`integration_name`] - Validated integration names and target paths
//! - [`manifest_file`] - Loading and atomically saving `link.xml`
//! - [`output`] - User-facing messages and listings
//! - [`pipeline`] - Build, copy and manifest merge orchestration
//! - [`project`] - Unity project detection and layout
//! - [`registry`] - Integration registry operations
//! - [`stager`] - Copying artifacts into the asset tree
//! - [`store`] - Registry storage backends

pub mod builder;
pub mod cli;
pub mod collector;
pub mod commands;
pub mod config;
pub mod error;
pub mod executor;
pub mod integration_name;
pub mod manifest_file;
pub mod output;
pub mod pipeline;
pub mod project;
pub mod registry;
pub mod stager;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
