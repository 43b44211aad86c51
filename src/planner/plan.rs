//! Sync plan types.
//!
//! A [`CrudPlan`] is computed once per deploy and consumed once by the
//! executor. [`CrudPlan::operations`] flattens it into the order the
//! executor applies it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Create/update/delete lists for one kind of resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrudSet {
    /// Local paths with no remote counterpart.
    pub create: Vec<String>,
    /// Local paths that already exist remotely.
    pub update: Vec<String>,
    /// Remote paths with no local counterpart.
    pub delete: Vec<String>,
}

/// A remote path that matches more than one local path.
///
/// Every matching local path is updated. The plan carries the finding so
/// callers can surface it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ambiguity {
    /// The remote path.
    pub remote: String,
    /// Every local path it matches, first match first.
    pub locals: Vec<String>,
}

/// The computed set of operations for folders and files.
#[derive(Debug, Clone, Serialize)]
pub struct CrudPlan {
    /// When the plan was computed.
    pub created_at: DateTime<Utc>,
    /// Folder operations. `delete` is deepest-first, `create` shallowest-first.
    pub folders: CrudSet,
    /// File operations, shallowest-first.
    pub files: CrudSet,
    /// Remote paths matching several local paths.
    pub ambiguities: Vec<Ambiguity>,
}

/// Phase of the sync, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    /// Delete a remote file.
    DeleteFile,
    /// Delete a remote folder and its children.
    DeleteFolder,
    /// Replace the content of a remote file.
    UpdateFile,
    /// Create a remote folder.
    CreateFolder,
    /// Create a remote file.
    CreateFile,
}

/// One transport call of the sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOperation {
    /// What to do.
    pub kind: OperationKind,
    /// Resource path relative to the deployment root.
    pub path: String,
}

impl CrudPlan {
    /// Creates a plan from already ordered lists.
    #[must_use]
    pub fn new(folders: CrudSet, files: CrudSet, ambiguities: Vec<Ambiguity>) -> Self {
        Self {
            created_at: Utc::now(),
            folders,
            files,
            ambiguities,
        }
    }

    /// Returns the operations in execution order.
    ///
    /// Folder updates are not operations; folders are only created or
    /// deleted.
    #[must_use]
    pub fn operations(&self) -> Vec<SyncOperation> {
        let phases: [(OperationKind, &[String]); 5] = [
            (OperationKind::DeleteFile, &self.files.delete),
            (OperationKind::DeleteFolder, &self.folders.delete),
            (OperationKind::UpdateFile, &self.files.update),
            (OperationKind::CreateFolder, &self.folders.create),
            (OperationKind::CreateFile, &self.files.create),
        ];

        phases
            .into_iter()
            .flat_map(|(kind, paths)| {
                paths.iter().map(move |path| SyncOperation {
                    kind,
                    path: path.clone(),
                })
            })
            .collect()
    }

    /// Returns the number of transport calls the plan needs.
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.files.delete.len()
            + self.folders.delete.len()
            + self.files.update.len()
            + self.folders.create.len()
            + self.files.create.len()
    }

    /// Returns true if the plan has no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operation_count() == 0
    }

    /// Returns true if any remote path matched several local paths.
    #[must_use]
    pub fn has_ambiguities(&self) -> bool {
        !self.ambiguities.is_empty()
    }
}

impl OperationKind {
    /// Short label used in logs and reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DeleteFile => "delete file",
            Self::DeleteFolder => "delete folder",
            Self::UpdateFile => "update file",
            Self::CreateFolder => "create folder",
            Self::CreateFile => "create file",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.path)
    }
}

impl fmt::Display for Ambiguity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Remote path {} matches {} local paths: {}; all are updated",
            self.remote,
            self.locals.len(),
            self.locals.join(", ")
        )
    }
}

impl fmt::Display for CrudPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "folders: {} to create, {} existing, {} to delete; files: {} to create, {} to update, {} to delete",
            self.folders.create.len(),
            self.folders.update.len(),
            self.folders.delete.len(),
            self.files.create.len(),
            self.files.update.len(),
            self.files.delete.len(),
        )
    }
}
