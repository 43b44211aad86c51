//! Configuration parser for loading and merging configuration files.
//!
//! Precedence, lowest to highest: project file, environment (including a
//! `.env` file next to the project file), command-line overrides.

use crate::error::{ConfigError, DeployerError, Result};
use std::path::Path;
use tracing::{debug, info};

use super::spec::DeployConfig;

/// Environment variable holding the user name.
pub const ENV_USERNAME: &str = "UI5_DEPLOYER_USERNAME";

/// Environment variable holding the password.
pub const ENV_PASSWORD: &str = "UI5_DEPLOYER_PASSWORD";

/// Environment variable holding the ABAP transport request.
pub const ENV_TRANSPORT_REQUEST: &str = "UI5_DEPLOYER_TRANSPORT_REQUEST";

/// Values given on the command line that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// ABAP transport request.
    pub transport_request: Option<String>,
    /// User name.
    pub username: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// Cloud Foundry space.
    pub space: Option<String>,
}

/// Configuration parser for loading deployment configuration.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving relative paths.
    base_path: Option<std::path::PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<DeployConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(DeployerError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            DeployerError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<DeployConfig> {
        debug!("Parsing YAML configuration");

        let config: DeployConfig = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            DeployerError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        debug!(
            "Parsed configuration for project {} ({})",
            config.metadata.name, config.deployer.target_type
        );
        Ok(config)
    }

    /// Loads configuration and applies environment and command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_with_overrides(
        &self,
        path: impl AsRef<Path>,
        overrides: &ConfigOverrides,
    ) -> Result<DeployConfig> {
        let mut config = self.load_file(path)?;

        Self::apply_env_overrides(&mut config);
        Self::apply_overrides(&mut config, overrides);

        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(config: &mut DeployConfig) {
        if let Ok(username) = std::env::var(ENV_USERNAME) {
            debug!("Overriding credentials.username from environment");
            config.deployer.credentials.username = Some(username);
        }

        if let Ok(password) = std::env::var(ENV_PASSWORD) {
            debug!("Overriding credentials.password from environment");
            config.deployer.credentials.password = Some(password);
        }

        if let Ok(transport) = std::env::var(ENV_TRANSPORT_REQUEST)
            && let Some(repo) = config.deployer.abap_repository.as_mut()
        {
            debug!("Overriding abapRepository.transportRequest from environment");
            repo.transport_request = transport;
        }
    }

    /// Applies command-line overrides. Empty values are ignored.
    pub fn apply_overrides(config: &mut DeployConfig, overrides: &ConfigOverrides) {
        if let Some(transport) = non_empty(overrides.transport_request.as_deref())
            && let Some(repo) = config.deployer.abap_repository.as_mut()
        {
            debug!("Overriding abapRepository.transportRequest from command line");
            repo.transport_request = transport.to_string();
        }

        let username = non_empty(overrides.username.as_deref());
        let password = non_empty(overrides.password.as_deref());
        if username.is_some() || password.is_some() {
            debug!("Overriding credentials from command line");
            config.deployer.credentials.username = username.map(String::from);
            config.deployer.credentials.password = password.map(String::from);
        }

        if let Some(space) = non_empty(overrides.space.as_deref())
            && let Some(cf) = config
                .deployer
                .sap_cloud_platform
                .as_mut()
                .and_then(|p| p.cloud_foundry.as_mut())
        {
            debug!("Overriding cloudFoundry.space from command line");
            cf.space = space.to_string();
        }
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| std::path::PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                DeployerError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "ui5-deploy.yaml",
    "ui5-deploy.yml",
    "ui5.yaml",
    "ui5.yml",
];

/// Finds the configuration file in the given directory or its parents.
///
/// # Errors
///
/// Returns an error if no configuration file is found.
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Result<std::path::PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found configuration file: {}", config_path.display());
                return Ok(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    Err(DeployerError::Config(ConfigError::FileNotFound {
        path: start.join(DEFAULT_CONFIG_FILES[0]),
    }))
}
