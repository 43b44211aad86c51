//! ui5-deploy CLI entrypoint.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ui5_deployer::cli::{Cli, Commands, OutputFormatter};
use ui5_deployer::config::{
    ConfigOverrides, ConfigParser, ConfigValidator, DeployConfig, find_config_file,
};
use ui5_deployer::deployer::{DeployerRegistry, deploy_project, plan_project};
use ui5_deployer::error::Result;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);
    let overrides = cli.command.overrides();

    match cli.command {
        Commands::Deploy { .. } => cmd_deploy(cli.config.as_ref(), &overrides, &formatter).await,
        Commands::Plan { detailed } => cmd_plan(cli.config.as_ref(), detailed, &formatter).await,
        Commands::Validate { warnings } => cmd_validate(cli.config.as_ref(), warnings, &formatter),
    }
}

/// Deploy the project.
async fn cmd_deploy(
    config_path: Option<&PathBuf>,
    overrides: &ConfigOverrides,
    formatter: &OutputFormatter,
) -> Result<()> {
    let (config, project_dir) = load_config(config_path, overrides)?;

    let registry = DeployerRegistry::with_builtins();
    let report = deploy_project(&registry, &config, &project_dir).await?;

    println!("{}", formatter.format_report(&report));
    Ok(())
}

/// Show what a deploy would change.
async fn cmd_plan(
    config_path: Option<&PathBuf>,
    detailed: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let (config, project_dir) = load_config(config_path, &ConfigOverrides::default())?;

    let plan = plan_project(&config, &project_dir).await?;

    println!("{}", formatter.format_plan(&plan, detailed));
    Ok(())
}

/// Validate configuration.
fn cmd_validate(
    config_path: Option<&PathBuf>,
    show_warnings: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let (config, _) = load_config(config_path, &ConfigOverrides::default())?;
    info!("Validating configuration for {}", config.metadata.name);

    let result = ConfigValidator::new().validate(&config)?;

    println!("{}", formatter.format_validation(&config, &result, show_warnings));
    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves the configuration file path.
fn resolve_config_path(config_path: Option<&PathBuf>) -> Result<PathBuf> {
    config_path.map_or_else(|| find_config_file("."), |path| Ok(path.clone()))
}

/// Loads the project file with environment and command-line overrides.
///
/// Returns the configuration and the project directory, which is the
/// directory holding the project file.
fn load_config(
    config_path: Option<&PathBuf>,
    overrides: &ConfigOverrides,
) -> Result<(DeployConfig, PathBuf)> {
    let config_file = resolve_config_path(config_path)?;
    debug!("Loading configuration from: {}", config_file.display());

    let project_dir = config_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    let parser = ConfigParser::new().with_base_path(&project_dir);
    parser.load_dotenv()?;
    let config = parser.load_with_overrides(&config_file, overrides)?;

    Ok((config, project_dir))
}
