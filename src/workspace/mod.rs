//! Local workspace: the build output that gets deployed.
//!
//! The workspace walks the source directory and yields one
//! [`ResourceHandle`] per file, skipping anything matched by the configured
//! exclude patterns. Patterns follow gitignore semantics.

mod resource;

pub use resource::{ResourceHandle, ResourceSet};

use ignore::WalkBuilder;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

use crate::config::DeployerConfig;
use crate::error::{ConfigError, DeployerError, Result};

/// The local build output of a project.
#[derive(Debug)]
pub struct LocalWorkspace {
    /// Directory whose contents are deployed.
    source_dir: PathBuf,
    /// Exclude matcher rooted at `source_dir`.
    excludes: Gitignore,
}

impl LocalWorkspace {
    /// Creates a workspace over `source_dir` with patterns relative to it.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern cannot be compiled.
    pub fn new(source_dir: impl Into<PathBuf>, excludes: &[String]) -> Result<Self> {
        let source_dir = source_dir.into();
        let mut builder = GitignoreBuilder::new(&source_dir);

        for pattern in excludes {
            builder.add_line(None, pattern).map_err(|e| {
                DeployerError::Config(ConfigError::InvalidExclude {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })
            })?;
        }

        let excludes = builder.build().map_err(|e| {
            DeployerError::Config(ConfigError::InvalidExclude {
                pattern: excludes.join(", "),
                message: e.to_string(),
            })
        })?;

        Ok(Self {
            source_dir,
            excludes,
        })
    }

    /// Creates the workspace described by a deployer section.
    ///
    /// Exclude patterns in the project file are written relative to the
    /// project root; they are rebased onto the source directory here.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern cannot be compiled.
    pub fn from_config(project_dir: &Path, deployer: &DeployerConfig) -> Result<Self> {
        let source = deployer.trimmed_source_path();
        let excludes: Vec<String> = deployer
            .resources
            .excludes
            .iter()
            .map(|pattern| rebase_exclude(pattern, source))
            .collect();

        Self::new(project_dir.join(source), &excludes)
    }

    /// Returns the directory whose contents are deployed.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Lists all deployable files, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns an error if the source directory cannot be walked.
    pub fn list(&self) -> Result<ResourceSet> {
        info!("Listing local resources in {}", self.source_dir.display());

        if !self.source_dir.is_dir() {
            return Err(DeployerError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Source directory not found: {}", self.source_dir.display()),
            )));
        }

        let mut handles = Vec::new();
        let walker = WalkBuilder::new(&self.source_dir)
            .standard_filters(false)
            .follow_links(true)
            .build();

        for entry in walker {
            let entry = entry.map_err(|e| DeployerError::Io(std::io::Error::other(e.to_string())))?;
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            let Ok(relative) = entry.path().strip_prefix(&self.source_dir) else {
                continue;
            };
            if relative.as_os_str().is_empty() || is_dir {
                continue;
            }
            if self
                .excludes
                .matched_path_or_any_parents(relative, false)
                .is_ignore()
            {
                trace!("Excluded {}", relative.display());
                continue;
            }

            handles.push(ResourceHandle::from_file(
                to_resource_path(relative),
                entry.path(),
            ));
        }

        handles.sort_by(|a, b| a.path().cmp(b.path()));
        debug!("Found {} local resources", handles.len());
        Ok(ResourceSet::new(handles))
    }
}

/// Converts a relative filesystem path into a `/`-rooted resource path.
fn to_resource_path(relative: &Path) -> String {
    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("/{}", segments.join("/"))
}

/// Rebases a project-relative exclude pattern onto the source directory.
fn rebase_exclude(pattern: &str, source: &str) -> String {
    let trimmed = pattern.trim_start_matches("./");
    match trimmed.strip_prefix(source) {
        Some(rest) if !source.is_empty() && (rest.is_empty() || rest.starts_with('/')) => {
            format!("/{}", rest.trim_start_matches('/'))
        }
        _ => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn create_project() -> TempDir {
        let temp = TempDir::new().unwrap();
        let dist = temp.path().join("dist");
        write(&dist, "index.html", "<html/>");
        write(&dist, "Component.js", "sap.ui.define([])");
        write(&dist, "i18n/i18n.properties", "title=App");
        write(&dist, "test/unit/AllTests.js", "QUnit");
        write(&dist, "js/map.js.map", "{}");
        temp
    }

    #[test]
    fn test_lists_all_files_sorted() {
        let temp = create_project();
        let workspace = LocalWorkspace::new(temp.path().join("dist"), &[]).unwrap();

        let resources = workspace.list().unwrap();
        assert_eq!(
            resources.paths(),
            vec![
                "/Component.js",
                "/i18n/i18n.properties",
                "/index.html",
                "/js/map.js.map",
                "/test/unit/AllTests.js",
            ]
        );
    }

    #[test]
    fn test_excludes_rebased_from_project_root() {
        let temp = create_project();
        let deployer: DeployerConfig = serde_yaml::from_str(
            "type: sap-netweaver\nsourcePath: dist/\nresources:\n  excludes:\n    - dist/test/**\n    - '*.map'\n",
        )
        .unwrap();

        let workspace = LocalWorkspace::from_config(temp.path(), &deployer).unwrap();
        let paths = workspace.list().unwrap().paths();

        assert!(!paths.iter().any(|p| p.starts_with("/test/")));
        assert!(!paths.iter().any(|p| p.ends_with(".map")));
        assert!(paths.contains(&String::from("/index.html")));
    }

    #[test]
    fn test_missing_source_dir() {
        let temp = TempDir::new().unwrap();
        let workspace = LocalWorkspace::new(temp.path().join("dist"), &[]).unwrap();
        assert!(workspace.list().is_err());
    }

    #[test]
    fn test_rebase_exclude() {
        assert_eq!(rebase_exclude("dist/test/**", "dist"), "/test/**");
        assert_eq!(rebase_exclude("./dist/x.js", "dist"), "/x.js");
        assert_eq!(rebase_exclude("*.map", "dist"), "*.map");
        assert_eq!(rebase_exclude("distribution/a", "dist"), "distribution/a");
    }
}
