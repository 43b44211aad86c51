//! Configuration specification types for the deployer.
//!
//! These structs map to the project YAML file (`ui5-deploy.yaml`). Only the
//! `metadata` and `deployer` sections are read; anything else in the file is
//! ignored so the deployer can share a file with the build tooling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The root configuration structure for a deployment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeployConfig {
    /// Project metadata.
    pub metadata: ProjectMetadata,
    /// Deployer section.
    pub deployer: DeployerConfig,
}

/// Project metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectMetadata {
    /// Project name.
    pub name: String,
}

/// The deployer section of the project file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeployerConfig {
    /// Deployer type name, resolved through the registry.
    #[serde(rename = "type")]
    pub target_type: String,
    /// Build output directory, relative to the project root.
    #[serde(default = "default_source_path")]
    pub source_path: String,
    /// Connection settings.
    #[serde(default)]
    pub connection: ConnectionConfig,
    /// Credentials.
    #[serde(default)]
    pub credentials: Credentials,
    /// ABAP repository settings (NetWeaver targets).
    #[serde(default)]
    pub abap_repository: Option<AbapRepositoryConfig>,
    /// Cloud Platform settings (Cloud Foundry and Neo targets).
    #[serde(default)]
    pub sap_cloud_platform: Option<CloudPlatformConfig>,
    /// Resource selection.
    #[serde(default)]
    pub resources: ResourcesConfig,
}

/// Connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Base URL of the target system.
    #[serde(default)]
    pub url: String,
    /// Whether TLS certificates are verified.
    #[serde(rename = "strictSSL", default = "default_strict_ssl")]
    pub strict_ssl: bool,
    /// Additional CA certificate (PEM) used when `strictSSL` is on.
    #[serde(rename = "SSLCertificatePath", default)]
    pub ssl_certificate_path: Option<String>,
}

/// Login credentials.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// User name.
    #[serde(default)]
    pub username: Option<String>,
    /// Password.
    #[serde(default)]
    pub password: Option<String>,
}

/// ABAP repository settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AbapRepositoryConfig {
    /// SAP client (`sap-client`).
    #[serde(default)]
    pub client: Option<String>,
    /// Logon language (`sap-language`).
    #[serde(default)]
    pub language: Option<String>,
    /// Transport request grouping the changes.
    #[serde(default)]
    pub transport_request: String,
    /// ABAP package.
    #[serde(default)]
    pub package: String,
    /// BSP application name.
    #[serde(default)]
    pub bsp_application: String,
    /// BSP application description.
    #[serde(default)]
    pub bsp_application_text: String,
    /// Recalculate the application index after deployment.
    #[serde(default)]
    pub app_index_calculate: bool,
    /// Skip ADT discovery, package and transport checks.
    #[serde(default)]
    pub skip_adt_validations: bool,
}

/// Cloud Platform settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CloudPlatformConfig {
    /// Cloud Foundry environment.
    #[serde(default)]
    pub cloud_foundry: Option<CloudFoundryConfig>,
    /// Neo environment.
    #[serde(default)]
    pub neo: Option<NeoConfig>,
}

/// Cloud Foundry settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CloudFoundryConfig {
    /// Organization.
    #[serde(default)]
    pub org: String,
    /// Space.
    #[serde(default)]
    pub space: String,
    /// Directory containing the `cf` binary.
    #[serde(default)]
    pub cli_path: Option<String>,
}

/// Neo settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NeoConfig {
    /// Subaccount technical name.
    #[serde(default)]
    pub account: String,
    /// Directory containing the `neo` binary.
    #[serde(default)]
    pub cli_path: Option<String>,
}

/// Resource selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourcesConfig {
    /// Glob patterns, relative to the project root, excluded from deployment.
    #[serde(default)]
    pub excludes: Vec<String>,
}

// Default value functions

fn default_source_path() -> String {
    String::from("dist")
}

const fn default_strict_ssl() -> bool {
    true
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            strict_ssl: default_strict_ssl(),
            ssl_certificate_path: None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Credentials {
    /// Returns the user name, or an empty string.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or_default()
    }

    /// Returns the password, or an empty string.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or_default()
    }

    /// Returns true if both user name and password are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.username().is_empty() && !self.password().is_empty()
    }
}

impl AbapRepositoryConfig {
    /// Returns true if the package is a local (`$`-prefixed) package.
    ///
    /// Local packages are not transportable, so no transport request applies.
    #[must_use]
    pub fn is_local_package(&self) -> bool {
        self.package.starts_with('$')
    }

    /// Returns the transport request to send with changes.
    #[must_use]
    pub fn effective_transport_request(&self) -> &str {
        if self.is_local_package() {
            ""
        } else {
            &self.transport_request
        }
    }
}

impl DeployerConfig {
    /// Returns the ABAP repository settings or their defaults.
    #[must_use]
    pub fn abap_repository(&self) -> AbapRepositoryConfig {
        self.abap_repository.clone().unwrap_or_default()
    }

    /// Returns the Cloud Foundry settings, if configured.
    #[must_use]
    pub fn cloud_foundry(&self) -> Option<&CloudFoundryConfig> {
        self.sap_cloud_platform
            .as_ref()
            .and_then(|p| p.cloud_foundry.as_ref())
    }

    /// Returns the Neo settings, if configured.
    #[must_use]
    pub fn neo(&self) -> Option<&NeoConfig> {
        self.sap_cloud_platform.as_ref().and_then(|p| p.neo.as_ref())
    }

    /// Returns the source path without surrounding separators.
    #[must_use]
    pub fn trimmed_source_path(&self) -> &str {
        self.source_path
            .trim_start_matches("./")
            .trim_matches('/')
    }
}
