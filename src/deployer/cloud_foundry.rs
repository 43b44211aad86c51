//! SAP Cloud Platform, Cloud Foundry environment deployer.
//!
//! Logs in with the `cf` tool, then pushes the manifest named by the
//! source path.

use async_trait::async_trait;

use crate::config::TYPE_CLOUD_FOUNDRY;
use crate::error::{ConfigError, Result};
use crate::transport::{CliCommand, locate_program};

use super::{DeployContext, DeployOutcome, Deployer};

const PROGRAM: &str = "cf";

/// Deploys with the Cloud Foundry command-line tool.
#[derive(Debug, Default, Clone, Copy)]
pub struct CloudFoundryDeployer;

impl CloudFoundryDeployer {
    /// Builds the login and push command lines.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the Cloud Foundry section is missing.
    pub fn commands(context: &DeployContext<'_>) -> Result<[CliCommand; 2]> {
        let deployer = context.deployer();
        let cf = deployer.cloud_foundry().ok_or_else(|| {
            ConfigError::validation(
                "Cloud Foundry settings are required",
                "deployer.sapCloudPlatform.cloudFoundry",
            )
        })?;
        let program = locate_program(cf.cli_path.as_deref(), PROGRAM);

        let login = CliCommand::new(&program)
            .arg("login")
            .flag("-a", &deployer.connection.url)
            .flag("-u", deployer.credentials.username())
            .secret_flag("-p", deployer.credentials.password())
            .flag("-o", &cf.org)
            .flag("-s", &cf.space)
            .current_dir(context.project_dir);
        let push = CliCommand::new(&program)
            .arg("push")
            .flag("-f", deployer.trimmed_source_path())
            .current_dir(context.project_dir);

        Ok([login, push])
    }
}

#[async_trait]
impl Deployer for CloudFoundryDeployer {
    fn name(&self) -> &'static str {
        TYPE_CLOUD_FOUNDRY
    }

    async fn deploy(&self, context: &DeployContext<'_>) -> Result<DeployOutcome> {
        let commands = Self::commands(context)?;
        context.existing_source()?;

        for command in &commands {
            command.run().await?;
        }

        Ok(DeployOutcome::Commands {
            commands: commands.iter().map(CliCommand::rendered).collect(),
        })
    }
}
