//! SAP Cloud Platform, Neo environment deployer.

use async_trait::async_trait;

use crate::config::TYPE_NEO;
use crate::error::{ConfigError, Result};
use crate::transport::{CliCommand, locate_program};

use super::{DeployContext, DeployOutcome, Deployer};

const PROGRAM: &str = "neo";

/// Deploys an MTA archive with the Neo console client.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeoDeployer;

impl NeoDeployer {
    /// Builds the `deploy-mta` command line.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the Neo section is missing.
    pub fn command(context: &DeployContext<'_>) -> Result<CliCommand> {
        let deployer = context.deployer();
        let neo = deployer.neo().ok_or_else(|| {
            ConfigError::validation("Neo settings are required", "deployer.sapCloudPlatform.neo")
        })?;

        Ok(CliCommand::new(locate_program(neo.cli_path.as_deref(), PROGRAM))
            .arg("deploy-mta")
            .flag("--host", &deployer.connection.url)
            .flag("--account", &neo.account)
            .flag("--user", deployer.credentials.username())
            .secret_flag("--password", deployer.credentials.password())
            .flag("--source", context.source().display().to_string())
            .arg("--synchronous")
            .current_dir(context.project_dir))
    }
}

#[async_trait]
impl Deployer for NeoDeployer {
    fn name(&self) -> &'static str {
        TYPE_NEO
    }

    async fn deploy(&self, context: &DeployContext<'_>) -> Result<DeployOutcome> {
        let command = Self::command(context)?;
        context.existing_source()?;

        command.run().await?;
        Ok(DeployOutcome::Commands {
            commands: vec![command.rendered()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigParser, DeployConfig};
    use crate::error::{DeployerError, TransportError};
    use crate::workspace::LocalWorkspace;
    use tempfile::TempDir;

    fn config(cli_path: &str) -> DeployConfig {
        let yaml = format!(
            r"
metadata:
  name: app
deployer:
  type: sap-cp-neo
  sourcePath: ./dist/app.mtar
  connection:
    url: https://hana.ondemand.com
  credentials:
    username: P000001
    password: s3cret
  sapCloudPlatform:
    neo:
      account: a1b2c3
      cliPath: '{cli_path}'
"
        );
        ConfigParser::new().parse_yaml(&yaml, None).unwrap()
    }

    #[test]
    fn test_command() {
        let temp = TempDir::new().unwrap();
        let config = config("");
        let workspace = LocalWorkspace::new(temp.path(), &[]).unwrap();
        let context = DeployContext::new(&config, temp.path(), &workspace);

        let command = NeoDeployer::command(&context).unwrap();
        let source = temp.path().join("dist/app.mtar");
        assert_eq!(
            command.rendered(),
            format!(
                "neo deploy-mta --host https://hana.ondemand.com --account a1b2c3 --user P000001 --password *** --source {} --synchronous",
                source.display()
            )
        );
    }

    #[test]
    fn test_missing_section() {
        let temp = TempDir::new().unwrap();
        let mut config = config("");
        config.deployer.sap_cloud_platform = None;
        let workspace = LocalWorkspace::new(temp.path(), &[]).unwrap();
        let context = DeployContext::new(&config, temp.path(), &workspace);

        assert!(matches!(
            NeoDeployer::command(&context).unwrap_err(),
            DeployerError::Config(_)
        ));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("dist")).unwrap();
        std::fs::write(temp.path().join("dist/app.mtar"), "mtar").unwrap();

        let config = config("/nonexistent/neo-sdk/tools");
        let workspace = LocalWorkspace::new(temp.path(), &[]).unwrap();
        let context = DeployContext::new(&config, temp.path(), &workspace);

        let err = NeoDeployer.deploy(&context).await.unwrap_err();
        match err {
            DeployerError::Transport(TransportError::ProcessFailed { command, message }) => {
                assert!(command.contains("--password ***"));
                assert!(message.starts_with("Failed to start subprocess"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
