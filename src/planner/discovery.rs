//! Remote discovery.
//!
//! Walks the remote folder tree starting at the application root. Sibling
//! folders are listed concurrently; every level is merged before its parent
//! returns. Reads only, so no ordering is required between siblings.

use futures::FutureExt;
use futures::future::{BoxFuture, try_join_all};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::transport::RemoteStore;

use super::paths::normalize_remote_path;

/// Remote folder and file paths, normalized to the local namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemotePathSet {
    /// Folder paths.
    pub folders: Vec<String>,
    /// File paths.
    pub files: Vec<String>,
}

impl RemotePathSet {
    /// Returns the total number of paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.folders.len() + self.files.len()
    }

    /// Returns true if nothing exists remotely.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }

    fn merge(&mut self, other: Self) {
        self.folders.extend(other.folders);
        self.files.extend(other.files);
    }
}

/// Where discovery starts and how remote ids map to local paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRoot {
    /// Raw id of the application root folder.
    pub id: String,
    /// Leading id segment stripped during normalization.
    pub app_prefix: String,
}

impl RemoteRoot {
    /// Creates a root.
    #[must_use]
    pub fn new(id: impl Into<String>, app_prefix: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            app_prefix: app_prefix.into(),
        }
    }
}

/// Lists everything below `root`.
///
/// # Errors
///
/// Returns the first listing error unchanged.
pub async fn discover<S>(store: &S, root: &RemoteRoot) -> Result<RemotePathSet>
where
    S: RemoteStore + ?Sized,
{
    info!("Discovering remote resources below {}", root.app_prefix);
    let found = walk(store, root.id.clone(), &root.app_prefix).await?;
    debug!(
        "Found {} remote folders and {} remote files",
        found.folders.len(),
        found.files.len()
    );
    Ok(found)
}

fn walk<'a, S>(store: &'a S, folder_id: String, app_prefix: &'a str) -> BoxFuture<'a, Result<RemotePathSet>>
where
    S: RemoteStore + ?Sized,
{
    async move {
        let listing = store.list_entries(&folder_id).await?;

        let mut found = RemotePathSet {
            folders: listing
                .folders
                .iter()
                .map(|id| normalize_remote_path(id, app_prefix))
                .collect(),
            files: listing
                .files
                .iter()
                .map(|id| normalize_remote_path(id, app_prefix))
                .collect(),
        };

        let children = try_join_all(
            listing
                .folders
                .into_iter()
                .map(|child| walk(store, child, app_prefix)),
        )
        .await?;

        for child in children {
            found.merge(child);
        }
        Ok(found)
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DeployerError, DiscoveryError};
    use crate::planner::memory::MemoryStore;
    use crate::transport::{MockRemoteStore, RemoteListing};

    #[tokio::test]
    async fn test_discover_recurses_into_folders() {
        let store = MemoryStore::new("ZAPP")
            .with_file("/index.html", "<html/>")
            .with_file("/js/main.js", "main")
            .with_file("/js/lib/util.js", "util");

        let mut found = discover(&store, &store.root()).await.unwrap();
        found.folders.sort();
        found.files.sort();

        assert_eq!(found.folders, vec!["/js", "/js/lib"]);
        assert_eq!(found.files, vec!["/index.html", "/js/lib/util.js", "/js/main.js"]);
    }

    #[tokio::test]
    async fn test_recursion_uses_raw_ids() {
        let mut store = MockRemoteStore::new();
        store
            .expect_list_entries()
            .withf(|id| id == "ZAPP")
            .times(1)
            .returning(|_| {
                Ok(RemoteListing {
                    folders: vec![String::from("ZAPP%2fjs")],
                    files: vec![String::from("ZAPP%2findex.html")],
                })
            });
        store
            .expect_list_entries()
            .withf(|id| id == "ZAPP%2fjs")
            .times(1)
            .returning(|_| {
                Ok(RemoteListing {
                    folders: vec![],
                    files: vec![String::from("ZAPP%2Fjs%2Fmain.js")],
                })
            });

        let found = discover(&store, &RemoteRoot::new("ZAPP", "ZAPP")).await.unwrap();
        assert_eq!(found.folders, vec!["/js"]);
        assert_eq!(found.files, vec!["/index.html", "/js/main.js"]);
    }

    #[tokio::test]
    async fn test_listing_error_propagates() {
        let mut store = MockRemoteStore::new();
        store.expect_list_entries().returning(|id| {
            Err(DeployerError::Discovery(DiscoveryError::malformed(id, "bad feed")))
        });

        let err = discover(&store, &RemoteRoot::new("ZAPP", "ZAPP")).await.unwrap_err();
        assert!(matches!(
            err,
            DeployerError::Discovery(DiscoveryError::MalformedListing { .. })
        ));
    }
}
