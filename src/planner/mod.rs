//! Planning module for sync operations.
//!
//! This module discovers what exists remotely, compares it with the local
//! resources, and applies the resulting plan.

mod diff;
mod discovery;
mod executor;
mod paths;
mod plan;

#[cfg(test)]
pub(crate) mod memory;

pub use diff::{
    DiffEngine, LocalPathSet, MatchPredicate, find_ambiguities, to_be_created, to_be_deleted,
    to_be_updated,
};
pub use discovery::{RemotePathSet, RemoteRoot, discover};
pub use executor::{SyncExecutor, SyncReport};
pub use paths::{
    DEFAULT_ROOT_DEPTH, deep_first, derive_local_folders, normalize_remote_path, segment_count,
    shallow_first, sort_shallow_first,
};
pub use plan::{Ambiguity, CrudPlan, CrudSet, OperationKind, SyncOperation};
