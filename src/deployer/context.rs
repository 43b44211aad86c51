//! Inputs and outputs of a deploy.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{DeployConfig, DeployerConfig};
use crate::error::{DeployerError, Result};
use crate::reconciler::ReconciliationResult;
use crate::workspace::LocalWorkspace;

/// Everything a deployer needs.
#[derive(Debug, Clone, Copy)]
pub struct DeployContext<'a> {
    /// Project configuration, overrides applied.
    pub config: &'a DeployConfig,
    /// Project root directory.
    pub project_dir: &'a Path,
    /// The build output to deploy.
    pub workspace: &'a LocalWorkspace,
}

impl<'a> DeployContext<'a> {
    /// Creates a context.
    #[must_use]
    pub const fn new(config: &'a DeployConfig, project_dir: &'a Path, workspace: &'a LocalWorkspace) -> Self {
        Self {
            config,
            project_dir,
            workspace,
        }
    }

    /// Returns the deployer section.
    #[must_use]
    pub const fn deployer(&self) -> &'a DeployerConfig {
        &self.config.deployer
    }

    /// Returns the source path resolved against the project directory.
    #[must_use]
    pub fn source(&self) -> PathBuf {
        self.project_dir.join(self.deployer().trimmed_source_path())
    }

    /// Returns the resolved source path, failing if nothing is there.
    ///
    /// # Errors
    ///
    /// Returns a not-found I/O error if the path does not exist.
    pub fn existing_source(&self) -> Result<PathBuf> {
        let source = self.source();
        if source.exists() {
            Ok(source)
        } else {
            Err(DeployerError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Source not found: {}", source.display()),
            )))
        }
    }
}

/// What a deployer did.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeployOutcome {
    /// Files were synchronized one by one.
    Synced(ReconciliationResult),
    /// The application was uploaded as one archive.
    Uploaded {
        /// Whether the application already existed.
        created: bool,
        /// Number of files in the archive.
        files: usize,
        /// Archive size in bytes.
        archive_bytes: usize,
    },
    /// External command lines were run.
    Commands {
        /// The command lines, secrets hidden.
        commands: Vec<String>,
    },
}

/// Final report of a successful deploy.
#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    /// Project name.
    pub project: String,
    /// Deployer type name.
    pub target_type: String,
    /// What the deployer did.
    pub outcome: DeployOutcome,
    /// Wall time of the whole deploy.
    pub elapsed: Duration,
}
