//! The remote store seam used by the sync engine.

use async_trait::async_trait;

use crate::error::Result;

/// One level of a remote folder listing.
///
/// Ids are raw as handed out by the server, still escaped and prefixed with
/// the application name. Pass a folder id back to
/// [`RemoteStore::list_entries`] to descend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteListing {
    /// Raw ids of child folders.
    pub folders: Vec<String>,
    /// Raw ids of child files.
    pub files: Vec<String>,
}

/// Transport primitives for a hierarchical remote file store.
///
/// Paths given to the mutating calls are relative to the deployment root
/// with a leading `/`. Every call either succeeds or fails with a transport
/// error; there is no partial success.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Authenticates and prepares the store. Failure is fatal.
    async fn connect(&self) -> Result<()>;

    /// Lists the direct children of a folder given by raw id.
    async fn list_entries(&self, folder_id: &str) -> Result<RemoteListing>;

    /// Creates a folder.
    async fn create_folder(&self, path: &str) -> Result<()>;

    /// Deletes a folder and everything below it.
    async fn delete_folder(&self, path: &str) -> Result<()>;

    /// Creates a file with the given content.
    async fn create_file(&self, path: &str, content: &[u8]) -> Result<()>;

    /// Replaces the content of an existing file.
    async fn update_file(&self, path: &str, content: &[u8]) -> Result<()>;

    /// Deletes a file.
    async fn delete_file(&self, path: &str) -> Result<()>;
}
