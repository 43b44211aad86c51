//! Configuration module for the deployer.
//!
//! This module handles all configuration-related functionality:
//! - Parsing and deserializing the project YAML file
//! - Environment and command-line overrides
//! - Validation of per-target settings

mod spec;
mod parser;
mod validator;

pub use spec::{
    AbapRepositoryConfig, CloudFoundryConfig, CloudPlatformConfig, ConnectionConfig, Credentials,
    DeployConfig, DeployerConfig, NeoConfig, ProjectMetadata, ResourcesConfig,
};
pub use parser::{
    ConfigOverrides, ConfigParser, DEFAULT_CONFIG_FILES, ENV_PASSWORD, ENV_TRANSPORT_REQUEST,
    ENV_USERNAME, find_config_file,
};
pub use validator::{
    ConfigValidator, TYPE_CLOUD_FOUNDRY, TYPE_NEO, TYPE_NETWEAVER, TYPE_NETWEAVER_ODATA,
    ValidationError, ValidationResult,
};
