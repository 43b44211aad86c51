//! Diff engine for comparing local and remote path sets.
//!
//! Local and remote paths denote the same resource when the predicate says
//! so; by default a remote path matches every local path it is a suffix of.
//! Folders and files are diffed independently.

use std::fmt;
use tracing::{debug, warn};

use super::discovery::RemotePathSet;
use super::paths::{DEFAULT_ROOT_DEPTH, deep_first, derive_local_folders, sort_shallow_first};
use super::plan::{Ambiguity, CrudPlan, CrudSet};

/// Identity test between a local path and a remote path.
#[derive(Clone, Copy)]
pub struct MatchPredicate {
    name: &'static str,
    test: fn(local: &str, remote: &str) -> bool,
}

impl MatchPredicate {
    /// The local path ends with the remote path.
    pub const SUFFIX: Self = Self::new("suffix", ends_with);

    /// The local path equals the remote path.
    pub const EXACT: Self = Self::new("exact", equals);

    /// Creates a named predicate.
    #[must_use]
    pub const fn new(name: &'static str, test: fn(&str, &str) -> bool) -> Self {
        Self { name, test }
    }

    /// Returns true if `local` and `remote` denote the same resource.
    #[must_use]
    pub fn matches(&self, local: &str, remote: &str) -> bool {
        (self.test)(local, remote)
    }

    /// Returns the predicate name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

fn ends_with(local: &str, remote: &str) -> bool {
    local.ends_with(remote)
}

fn equals(local: &str, remote: &str) -> bool {
    local == remote
}

impl Default for MatchPredicate {
    fn default() -> Self {
        Self::SUFFIX
    }
}

impl fmt::Debug for MatchPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MatchPredicate").field(&self.name).finish()
    }
}

/// Local paths with no matching remote path.
#[must_use]
pub fn to_be_created(local: &[String], remote: &[String], predicate: MatchPredicate) -> Vec<String> {
    local
        .iter()
        .filter(|l| !remote.iter().any(|r| predicate.matches(l, r)))
        .cloned()
        .collect()
}

/// Local paths with some matching remote path.
#[must_use]
pub fn to_be_updated(local: &[String], remote: &[String], predicate: MatchPredicate) -> Vec<String> {
    local
        .iter()
        .filter(|l| remote.iter().any(|r| predicate.matches(l, r)))
        .cloned()
        .collect()
}

/// Remote paths no local path matches.
#[must_use]
pub fn to_be_deleted(local: &[String], remote: &[String], predicate: MatchPredicate) -> Vec<String> {
    remote
        .iter()
        .filter(|r| !local.iter().any(|l| predicate.matches(l, r)))
        .cloned()
        .collect()
}

/// Remote paths that match more than one local path.
#[must_use]
pub fn find_ambiguities(
    local: &[String],
    remote: &[String],
    predicate: MatchPredicate,
) -> Vec<Ambiguity> {
    remote
        .iter()
        .filter_map(|r| {
            let locals: Vec<String> = local
                .iter()
                .filter(|l| predicate.matches(l, r))
                .cloned()
                .collect();
            (locals.len() > 1).then(|| Ambiguity {
                remote: r.clone(),
                locals,
            })
        })
        .collect()
}

/// Local file paths and the folders they imply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalPathSet {
    /// Folder paths, deduplicated.
    pub folders: Vec<String>,
    /// File paths, verbatim.
    pub files: Vec<String>,
}

impl LocalPathSet {
    /// Builds the set from file paths, deriving folders above `root_depth`.
    #[must_use]
    pub fn from_files(files: Vec<String>, root_depth: usize) -> Self {
        let folders = derive_local_folders(files.iter().map(String::as_str), root_depth);
        Self { folders, files }
    }
}

/// Engine computing a [`CrudPlan`] from local and remote path sets.
#[derive(Debug, Clone, Copy)]
pub struct DiffEngine {
    predicate: MatchPredicate,
    root_depth: usize,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffEngine {
    /// Creates an engine with suffix matching and the default root depth.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            predicate: MatchPredicate::SUFFIX,
            root_depth: DEFAULT_ROOT_DEPTH,
        }
    }

    /// Replaces the identity predicate.
    #[must_use]
    pub const fn with_predicate(mut self, predicate: MatchPredicate) -> Self {
        self.predicate = predicate;
        self
    }

    /// Sets how many leading segments make up the deployment root.
    #[must_use]
    pub const fn with_root_depth(mut self, root_depth: usize) -> Self {
        self.root_depth = root_depth;
        self
    }

    /// Returns the configured root depth.
    #[must_use]
    pub const fn root_depth(&self) -> usize {
        self.root_depth
    }

    /// Computes the plan for local file paths against a remote snapshot.
    ///
    /// Pure; calling it twice with the same inputs yields the same lists.
    #[must_use]
    pub fn compute(&self, local_files: &[String], remote: &RemotePathSet) -> CrudPlan {
        let local = LocalPathSet::from_files(local_files.to_vec(), self.root_depth);
        self.compute_sets(local, remote.clone())
    }

    /// Computes the plan for explicit local and remote sets.
    #[must_use]
    pub fn compute_sets(&self, local: LocalPathSet, remote: RemotePathSet) -> CrudPlan {
        let LocalPathSet {
            folders: mut local_folders,
            files: mut local_files,
        } = local;
        let RemotePathSet {
            folders: mut remote_folders,
            files: mut remote_files,
        } = remote;

        sort_shallow_first(&mut local_folders);
        sort_shallow_first(&mut local_files);
        sort_shallow_first(&mut remote_folders);
        sort_shallow_first(&mut remote_files);

        let folders = self.diff(&local_folders, &remote_folders, true);
        let files = self.diff(&local_files, &remote_files, false);

        let mut ambiguities = find_ambiguities(&local_folders, &remote_folders, self.predicate);
        ambiguities.extend(find_ambiguities(&local_files, &remote_files, self.predicate));
        for ambiguity in &ambiguities {
            warn!("{ambiguity}");
        }

        let plan = CrudPlan::new(folders, files, ambiguities);
        debug!("Computed plan ({} matching): {plan}", self.predicate.name());
        plan
    }

    fn diff(&self, local: &[String], remote: &[String], deepest_first_deletes: bool) -> CrudSet {
        let mut delete = to_be_deleted(local, remote, self.predicate);
        if deepest_first_deletes {
            delete.sort_by(|a, b| deep_first(a, b));
        }

        CrudSet {
            create: to_be_created(local, remote, self.predicate),
            update: to_be_updated(local, remote, self.predicate),
            delete,
        }
    }
}
