//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ConfigOverrides;

/// ui5-deploy - Deploys built UI5 applications.
#[derive(Parser, Debug)]
#[command(name = "ui5-deploy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the project file.
    #[arg(short, long, global = true, env = "UI5_DEPLOYER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy the project to its configured target.
    Deploy {
        /// ABAP transport request.
        #[arg(long)]
        transport_request: Option<String>,

        /// User name for the target system.
        #[arg(short, long)]
        username: Option<String>,

        /// Password for the target system.
        #[arg(short, long)]
        password: Option<String>,

        /// Cloud Foundry space.
        #[arg(long)]
        space: Option<String>,
    },

    /// Show what a deploy would change, without changing anything.
    Plan {
        /// List every operation.
        #[arg(short, long)]
        detailed: bool,
    },

    /// Validate the project file.
    Validate {
        /// Show warnings, not just errors.
        #[arg(short, long)]
        warnings: bool,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Commands {
    /// Returns the configuration overrides given on the command line.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        match self {
            Self::Deploy {
                transport_request,
                username,
                password,
                space,
            } => ConfigOverrides {
                transport_request: transport_request.clone(),
                username: username.clone(),
                password: password.clone(),
                space: space.clone(),
            },
            Self::Plan { .. } | Self::Validate { .. } => ConfigOverrides::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deploy_overrides() {
        let cli = Cli::try_parse_from([
            "ui5-deploy",
            "--config",
            "ui5-deploy.yaml",
            "deploy",
            "--transport-request",
            "DEVK900002",
            "-u",
            "DEV",
            "-p",
            "pw",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("ui5-deploy.yaml")));
        let overrides = cli.command.overrides();
        assert_eq!(overrides.transport_request.as_deref(), Some("DEVK900002"));
        assert_eq!(overrides.username.as_deref(), Some("DEV"));
        assert_eq!(overrides.password.as_deref(), Some("pw"));
        assert_eq!(overrides.space, None);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ui5-deploy", "plan", "--detailed", "--output", "json", "-v"])
            .unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.output, OutputFormat::Json));
        assert!(matches!(cli.command, Commands::Plan { detailed: true }));
        assert!(cli.command.overrides().username.is_none());
    }
}
