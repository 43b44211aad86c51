//! Error types for the UI5 deployer.
//!
//! Errors follow the deploy lifecycle: configuration problems surface before
//! anything touches the network, connection and authentication failures abort
//! before a plan is computed, discovery failures abort before any mutation,
//! and operation failures abort the running sync. Nothing in the sync path
//! wraps or reinterprets an error; the first one raised is the one returned.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the deployer.
#[derive(Debug, Error)]
pub enum DeployerError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Transport errors (HTTP services and CLI subprocesses).
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Remote discovery errors.
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Deployer registry errors.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// A credential is missing from file, environment and command line.
    #[error("Missing credential: {name}")]
    MissingCredential {
        /// Name of the missing credential.
        name: String,
    },

    /// An exclude pattern could not be compiled.
    #[error("Invalid exclude pattern '{pattern}': {message}")]
    InvalidExclude {
        /// The offending pattern.
        pattern: String,
        /// Description of the problem.
        message: String,
    },
}

/// Transport errors raised by remote targets.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The target rejected the credentials.
    #[error("Authentication failed against {url}: {message}")]
    AuthenticationFailed {
        /// URL that rejected the request.
        url: String,
        /// Description of the failure.
        message: String,
    },

    /// The target could not be reached.
    #[error("Connection to {url} failed: {message}")]
    ConnectionFailed {
        /// URL that could not be reached.
        url: String,
        /// Description of the failure.
        message: String,
    },

    /// The ADT discovery document lacks required services.
    #[error("ADT does not have all required services available: {}", missing.join(", "))]
    MissingServices {
        /// Service collections not found in discovery.
        missing: Vec<String>,
    },

    /// A request returned a non-success status.
    #[error("{status} - {method} {url}: {message}")]
    RequestFailed {
        /// HTTP method of the request.
        method: String,
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body or status text.
        message: String,
    },

    /// A CLI subprocess failed to start or exited with a non-zero code.
    #[error("Command '{command}' failed: {message}")]
    ProcessFailed {
        /// Rendered (redacted) command line.
        command: String,
        /// Exit status or spawn error.
        message: String,
    },

    /// The deployment archive could not be built.
    #[error("Failed to build archive: {message}")]
    Archive {
        /// Description of the archive failure.
        message: String,
    },
}

/// Errors raised while walking the remote resource tree.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A remote listing could not be interpreted.
    #[error("Malformed remote listing for '{folder}': {message}")]
    MalformedListing {
        /// Folder whose listing was malformed.
        folder: String,
        /// Description of the problem.
        message: String,
    },
}

/// Deployer registry errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No deployer is registered under the requested name.
    #[error("Unknown deployer type *{name}*")]
    UnknownType {
        /// Requested type name.
        name: String,
    },

    /// A deployer is already registered under the name.
    #[error("Deployer type already registered *{name}*")]
    DuplicateType {
        /// Duplicated type name.
        name: String,
    },
}

/// Result type alias for deployer operations.
pub type Result<T> = std::result::Result<T, DeployerError>;

impl DeployerError {
    /// Returns true if this error happened before any remote mutation.
    #[must_use]
    pub const fn is_pre_sync(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::Registry(_)
                | Self::Discovery(_)
                | Self::Transport(
                    TransportError::AuthenticationFailed { .. }
                        | TransportError::ConnectionFailed { .. }
                        | TransportError::MissingServices { .. }
                )
        )
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl TransportError {
    /// Creates a request error.
    #[must_use]
    pub fn request(
        method: impl Into<String>,
        url: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::RequestFailed {
            method: method.into(),
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates an archive error.
    #[must_use]
    pub fn archive(message: impl Into<String>) -> Self {
        Self::Archive {
            message: message.into(),
        }
    }

    /// Returns the HTTP status carried by this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl DiscoveryError {
    /// Creates a malformed-listing error.
    #[must_use]
    pub fn malformed(folder: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedListing {
            folder: folder.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pre_sync_classification() {
        let auth = DeployerError::Transport(TransportError::AuthenticationFailed {
            url: String::from("https://host"),
            message: String::from("401"),
        });
        assert!(auth.is_pre_sync());

        let op = DeployerError::Transport(TransportError::request("DELETE", "https://host/x", 500, "boom"));
        assert!(!op.is_pre_sync());
    }

    #[test]
    fn test_request_error_display() {
        let err = TransportError::request("PUT", "https://host/a", 403, "Forbidden");
        assert_eq!(err.to_string(), "403 - PUT https://host/a: Forbidden");
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn test_io_error_converts_and_is_not_pre_sync() {
        fn read() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "dist/index.html"))?;
            Ok(())
        }

        let err = read().unwrap_err();
        assert!(matches!(err, DeployerError::Io(_)));
        assert_eq!(err.to_string(), "IO error: dist/index.html");
        assert!(!err.is_pre_sync());
    }
}
