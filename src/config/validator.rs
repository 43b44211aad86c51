//! Configuration validation for deployer settings.
//!
//! Each target type needs a different subset of the deployer section. The
//! validator collects every problem it finds, returns the first error, and
//! keeps non-fatal findings as warnings.

use crate::error::{ConfigError, DeployerError, Result};
use tracing::debug;

use super::spec::{DeployConfig, DeployerConfig};

/// Type name of the ADT-based NetWeaver deployer.
pub const TYPE_NETWEAVER: &str = "sap-netweaver";

/// Type name of the OData-based NetWeaver deployer.
pub const TYPE_NETWEAVER_ODATA: &str = "sap-netweaver-odata";

/// Type name of the Cloud Foundry deployer.
pub const TYPE_CLOUD_FOUNDRY: &str = "sap-cp-cf";

/// Type name of the Neo deployer.
pub const TYPE_NEO: &str = "sap-cp-neo";

/// Maximum length of a BSP application name.
const MAX_BSP_NAME_LEN: usize = 15;

/// Validator for deployment configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all findings.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a deployment configuration.
    ///
    /// Unknown target types are left to the registry, which owns the set of
    /// available deployers.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found.
    pub fn validate(&self, config: &DeployConfig) -> Result<ValidationResult> {
        let mut result = self.check(config);

        if result.errors.is_empty() {
            debug!("Configuration validation passed");
            Ok(result)
        } else {
            let first_error = result.errors.remove(0);
            if let Some(name) = first_error.field.strip_prefix("deployer.credentials.") {
                return Err(DeployerError::Config(ConfigError::MissingCredential {
                    name: name.to_string(),
                }));
            }
            Err(DeployerError::Config(ConfigError::ValidationError {
                message: first_error.message,
                field: Some(first_error.field),
            }))
        }
    }

    /// Collects all findings without failing.
    #[must_use]
    pub fn check(&self, config: &DeployConfig) -> ValidationResult {
        let mut result = ValidationResult::default();
        let deployer = &config.deployer;

        if config.metadata.name.trim().is_empty() {
            result.error("metadata.name", "Project name cannot be empty");
        }
        if deployer.trimmed_source_path().is_empty() {
            result.error("deployer.sourcePath", "Source path cannot be empty");
        }

        match deployer.target_type.as_str() {
            TYPE_NETWEAVER | TYPE_NETWEAVER_ODATA => {
                Self::validate_connection(deployer, &mut result);
                Self::validate_credentials(deployer, &mut result);
                Self::validate_abap_repository(deployer, &mut result);
            }
            TYPE_CLOUD_FOUNDRY => {
                Self::validate_connection(deployer, &mut result);
                Self::validate_credentials(deployer, &mut result);
                Self::validate_cloud_foundry(deployer, &mut result);
            }
            TYPE_NEO => {
                Self::validate_connection(deployer, &mut result);
                Self::validate_credentials(deployer, &mut result);
                Self::validate_neo(deployer, &mut result);
            }
            other => {
                result
                    .warnings
                    .push(format!("Deployer type '{other}' is not a built-in type"));
            }
        }

        result
    }

    fn validate_connection(deployer: &DeployerConfig, result: &mut ValidationResult) {
        let url = deployer.connection.url.trim();
        if url.is_empty() {
            result.error("deployer.connection.url", "Connection URL is required");
        } else if !url.starts_with("http://") && !url.starts_with("https://") {
            result.error(
                "deployer.connection.url",
                &format!("Connection URL '{url}' must start with http:// or https://"),
            );
        }

        if !deployer.connection.strict_ssl {
            result
                .warnings
                .push(String::from("strictSSL is off: TLS certificates will not be verified"));
        }
    }

    fn validate_credentials(deployer: &DeployerConfig, result: &mut ValidationResult) {
        if deployer.credentials.username().is_empty() {
            result.error("deployer.credentials.username", "User name is required");
        }
        if deployer.credentials.password().is_empty() {
            result.error("deployer.credentials.password", "Password is required");
        }
    }

    fn validate_abap_repository(deployer: &DeployerConfig, result: &mut ValidationResult) {
        let Some(repo) = deployer.abap_repository.as_ref() else {
            result.error("deployer.abapRepository", "ABAP repository settings are required");
            return;
        };

        if repo.bsp_application.is_empty() {
            result.error(
                "deployer.abapRepository.bspApplication",
                "BSP application name is required",
            );
        } else if repo.bsp_application.chars().count() > MAX_BSP_NAME_LEN {
            result.error(
                "deployer.abapRepository.bspApplication",
                &format!(
                    "BSP application name '{}' exceeds {MAX_BSP_NAME_LEN} characters",
                    repo.bsp_application
                ),
            );
        }

        if repo.package.is_empty() {
            result.error("deployer.abapRepository.package", "ABAP package is required");
        } else if !repo.is_local_package() && repo.transport_request.is_empty() {
            result.error(
                "deployer.abapRepository.transportRequest",
                &format!(
                    "Package '{}' is transportable and needs a transport request",
                    repo.package
                ),
            );
        }

        if repo.skip_adt_validations {
            result
                .warnings
                .push(String::from("skipAdtValidations is on: ADT checks will be skipped"));
        }
    }

    fn validate_cloud_foundry(deployer: &DeployerConfig, result: &mut ValidationResult) {
        let Some(cf) = deployer.cloud_foundry() else {
            result.error(
                "deployer.sapCloudPlatform.cloudFoundry",
                "Cloud Foundry settings are required",
            );
            return;
        };

        if cf.org.is_empty() {
            result.error("deployer.sapCloudPlatform.cloudFoundry.org", "Organization is required");
        }
        if cf.space.is_empty() {
            result.error("deployer.sapCloudPlatform.cloudFoundry.space", "Space is required");
        }
    }

    fn validate_neo(deployer: &DeployerConfig, result: &mut ValidationResult) {
        match deployer.neo() {
            Some(neo) if !neo.account.is_empty() => {}
            Some(_) => result.error("deployer.sapCloudPlatform.neo.account", "Account is required"),
            None => result.error("deployer.sapCloudPlatform.neo", "Neo settings are required"),
        }
    }
}

impl ValidationResult {
    fn error(&mut self, field: &str, message: &str) {
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigParser;

    fn parse(yaml: &str) -> DeployConfig {
        ConfigParser::new().parse_yaml(yaml, None).unwrap()
    }

    #[test]
    fn test_valid_netweaver_config() {
        let config = parse(
            r"
metadata:
  name: app
deployer:
  type: sap-netweaver
  connection:
    url: https://abap.example.com
  credentials:
    username: DEV
    password: pw
  abapRepository:
    package: $TMP
    bspApplication: ZAPP
",
        );
        let result = ConfigValidator::new().validate(&config).unwrap();
        assert!(result.is_valid());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_transportable_package_needs_request() {
        let config = parse(
            r"
metadata:
  name: app
deployer:
  type: sap-netweaver
  connection:
    url: https://abap.example.com
  credentials:
    username: DEV
    password: pw
  abapRepository:
    package: ZUI5
    bspApplication: ZAPP
",
        );
        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert!(err.to_string().contains("transport request"));
    }

    #[test]
    fn test_collects_all_errors_and_warnings() {
        let config = parse(
            r"
metadata:
  name: app
deployer:
  type: sap-cp-cf
  connection:
    url: ftp://nope
    strictSSL: false
  sapCloudPlatform:
    cloudFoundry:
      org: my-org
",
        );
        let result = ConfigValidator::new().check(&config);
        let fields: Vec<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "deployer.connection.url",
                "deployer.credentials.username",
                "deployer.credentials.password",
                "deployer.sapCloudPlatform.cloudFoundry.space",
            ]
        );
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_bsp_name_length() {
        let config = parse(
            r"
metadata:
  name: app
deployer:
  type: sap-netweaver-odata
  connection:
    url: https://abap.example.com
  credentials:
    username: DEV
    password: pw
  abapRepository:
    package: $TMP
    bspApplication: ZTHIS_NAME_IS_TOO_LONG
",
        );
        let result = ConfigValidator::new().check(&config);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, "deployer.abapRepository.bspApplication");
    }

    #[test]
    fn test_missing_password_is_a_credential_error() {
        let config = parse(
            r"
metadata:
  name: app
deployer:
  type: sap-cp-neo
  connection:
    url: https://hana.ondemand.com
  credentials:
    username: P000001
  sapCloudPlatform:
    neo:
      account: a1b2c3
",
        );
        let err = ConfigValidator::new().validate(&config).unwrap_err();
        assert!(matches!(
            err,
            DeployerError::Config(ConfigError::MissingCredential { ref name }) if name == "password"
        ));
    }
}
