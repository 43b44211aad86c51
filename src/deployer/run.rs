//! Deploy entry points.

use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::config::{ConfigValidator, DeployConfig, TYPE_NETWEAVER};
use crate::error::{ConfigError, Result};
use crate::planner::CrudPlan;
use crate::workspace::LocalWorkspace;

use super::{DeployContext, DeployReport, DeployerRegistry, preview_adt};

/// Deploys a project with the deployer registered for its type.
///
/// The configuration is validated and the deployer resolved before the
/// clock starts; everything after that is reported with its elapsed time.
///
/// # Errors
///
/// Returns a config error for an invalid configuration, a registry error
/// for an unknown type, and otherwise the deployer's error unchanged.
pub async fn deploy_project(
    registry: &DeployerRegistry,
    config: &DeployConfig,
    project_dir: &Path,
) -> Result<DeployReport> {
    info!("Deploying project {}", config.metadata.name);

    let validation = ConfigValidator::new().validate(config)?;
    for warning in &validation.warnings {
        warn!("{warning}");
    }

    let target_type = config.deployer.target_type.as_str();
    let deployer = registry.get(target_type)?;

    let start = Instant::now();
    let result = async {
        let workspace = LocalWorkspace::from_config(project_dir, &config.deployer)?;
        let context = DeployContext::new(config, project_dir, &workspace);
        deployer.deploy(&context).await
    }
    .await;
    let elapsed = start.elapsed();

    match result {
        Ok(outcome) => {
            info!("Deploy succeeded in {elapsed:.2?}");
            Ok(DeployReport {
                project: config.metadata.name.clone(),
                target_type: target_type.to_string(),
                outcome,
                elapsed,
            })
        }
        Err(e) => {
            error!("{e}");
            error!("Deploy failed in {elapsed:.2?}");
            Err(e)
        }
    }
}

/// Computes what a `sap-netweaver` deploy would change.
///
/// # Errors
///
/// Returns a config error for other types or an invalid configuration,
/// and otherwise the connection or discovery error.
pub async fn plan_project(config: &DeployConfig, project_dir: &Path) -> Result<CrudPlan> {
    ConfigValidator::new().validate(config)?;
    if config.deployer.target_type != TYPE_NETWEAVER {
        return Err(ConfigError::validation(
            format!(
                "Plan preview is only available for {TYPE_NETWEAVER}, not {}",
                config.deployer.target_type
            ),
            "deployer.type",
        )
        .into());
    }

    let workspace = LocalWorkspace::from_config(project_dir, &config.deployer)?;
    let context = DeployContext::new(config, project_dir, &workspace);
    preview_adt(&context).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigParser;
    use crate::deployer::{DeployOutcome, Deployer};
    use crate::error::{DeployerError, RegistryError, TransportError};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recording {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Deployer for Recording {
        fn name(&self) -> &'static str {
            "custom"
        }

        async fn deploy(&self, context: &DeployContext<'_>) -> Result<DeployOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TransportError::connection("https://example.com", "refused").into());
            }
            Ok(DeployOutcome::Commands {
                commands: vec![context.workspace.source_dir().display().to_string()],
            })
        }
    }

    fn config(target_type: &str) -> DeployConfig {
        let yaml = format!(
            r"
metadata:
  name: my.app
deployer:
  type: {target_type}
  sourcePath: build
"
        );
        ConfigParser::new().parse_yaml(&yaml, None).unwrap()
    }

    #[tokio::test]
    async fn test_deploy_dispatches_by_type() {
        let temp = TempDir::new().unwrap();
        let deployer = Arc::new(Recording::default());
        let mut registry = DeployerRegistry::with_builtins();
        registry.register("custom", deployer.clone()).unwrap();

        let report = deploy_project(&registry, &config("custom"), temp.path())
            .await
            .unwrap();

        assert_eq!(deployer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.project, "my.app");
        assert_eq!(report.target_type, "custom");
        let DeployOutcome::Commands { commands } = report.outcome else {
            panic!("expected commands");
        };
        assert_eq!(commands, vec![temp.path().join("build").display().to_string()]);
    }

    #[tokio::test]
    async fn test_deploy_unknown_type() {
        let temp = TempDir::new().unwrap();
        let err = deploy_project(&DeployerRegistry::new(), &config("custom"), temp.path())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DeployerError::Registry(RegistryError::UnknownType { ref name }) if name == "custom"
        ));
    }

    #[tokio::test]
    async fn test_deploy_error_is_returned_unchanged() {
        let temp = TempDir::new().unwrap();
        let deployer = Arc::new(Recording {
            fail: true,
            ..Recording::default()
        });
        let mut registry = DeployerRegistry::new();
        registry.register("custom", deployer).unwrap();

        let err = deploy_project(&registry, &config("custom"), temp.path())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Transport error: Connection to https://example.com failed: refused"
        );
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected_before_deploy() {
        let temp = TempDir::new().unwrap();
        let deployer = Arc::new(Recording::default());
        let mut registry = DeployerRegistry::new();
        registry.register("custom", deployer.clone()).unwrap();

        let mut config = config("custom");
        config.metadata.name = String::new();

        let err = deploy_project(&registry, &config, temp.path()).await.unwrap_err();
        assert!(matches!(err, DeployerError::Config(_)));
        assert_eq!(deployer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_plan_requires_adt_type() {
        let temp = TempDir::new().unwrap();
        let err = plan_project(&config("custom"), temp.path()).await.unwrap_err();
        assert!(matches!(err, DeployerError::Config(_)));
    }
}
