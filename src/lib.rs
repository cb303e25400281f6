//! `discovery` - RICE idea board CLI
//!
//! This crate provides the `disc` command-line front-end over
//! [`discovery_lib`], which holds the board model, projections and the drag
//! protocol.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - `config.yaml` loading and CLI/env overrides
//! - [`format`] - Output formatting (text tables, kanban columns, JSON)
//! - [`logging`] - tracing subscriber setup
//! - [`sync`] - HTTP backup transport
//! - [`validation`] - Form validation for ideas and projects

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod format;
pub mod logging;
pub mod sync;
pub mod validation;

/// Run the CLI application.
///
/// This is the main entry point called from `main()`.
///
/// # Errors
///
/// Returns an error if command execution fails.
pub fn run() -> anyhow::Result<()> {
    cli::run()
}
