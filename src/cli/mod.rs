//! CLI module for the UI5 deployer.
//!
//! This module provides the command-line interface: argument parsing and
//! rendering of plans, reports and validation results.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use output::OutputFormatter;
