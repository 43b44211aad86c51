//! Local resource handles.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;

/// One local file to deploy.
///
/// The path is relative to the deployment root, POSIX style, with a leading
/// `/`. Content is read lazily and may be read any number of times.
#[derive(Debug, Clone)]
pub struct ResourceHandle {
    path: String,
    source: ContentSource,
}

#[derive(Debug, Clone)]
enum ContentSource {
    File(PathBuf),
    Memory(Arc<[u8]>),
}

impl ResourceHandle {
    /// Creates a handle backed by a file on disk.
    #[must_use]
    pub fn from_file(path: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            source: ContentSource::File(file.into()),
        }
    }

    /// Creates a handle backed by bytes held in memory.
    #[must_use]
    pub fn in_memory(path: impl Into<String>, content: impl Into<Arc<[u8]>>) -> Self {
        Self {
            path: path.into(),
            source: ContentSource::Memory(content.into()),
        }
    }

    /// Returns the resource path relative to the deployment root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the path without its leading separator.
    #[must_use]
    pub fn relative_path(&self) -> &str {
        self.path.trim_start_matches('/')
    }

    /// Reads the current content of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be read.
    pub async fn read_content(&self) -> Result<Vec<u8>> {
        match &self.source {
            ContentSource::File(file) => Ok(tokio::fs::read(file).await?),
            ContentSource::Memory(bytes) => Ok(bytes.to_vec()),
        }
    }
}

/// The ordered set of local resources for one deploy.
#[derive(Debug, Clone, Default)]
pub struct ResourceSet {
    handles: Vec<ResourceHandle>,
    index: HashMap<String, usize>,
}

impl ResourceSet {
    /// Builds a set from handles. Later duplicates of a path are dropped.
    #[must_use]
    pub fn new(handles: Vec<ResourceHandle>) -> Self {
        let mut index = HashMap::with_capacity(handles.len());
        let mut unique = Vec::with_capacity(handles.len());
        for handle in handles {
            if index.contains_key(handle.path()) {
                continue;
            }
            index.insert(handle.path().to_string(), unique.len());
            unique.push(handle);
        }
        Self {
            handles: unique,
            index,
        }
    }

    /// Looks up a resource by its exact path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&ResourceHandle> {
        self.index.get(path).and_then(|i| self.handles.get(*i))
    }

    /// Iterates over the resources in listing order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceHandle> {
        self.handles.iter()
    }

    /// Returns the resource paths in listing order.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.handles.iter().map(|h| h.path.clone()).collect()
    }

    /// Returns the number of resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns true if there are no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl FromIterator<ResourceHandle> for ResourceSet {
    fn from_iter<I: IntoIterator<Item = ResourceHandle>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_content_is_rereadable() {
        let handle = ResourceHandle::in_memory("/index.html", b"<html/>".to_vec());
        assert_eq!(handle.read_content().await.unwrap(), b"<html/>");
        assert_eq!(handle.read_content().await.unwrap(), b"<html/>");
        assert_eq!(handle.relative_path(), "index.html");
    }

    #[tokio::test]
    async fn test_file_content_read_on_demand() {
        let temp = tempfile::TempDir::new().unwrap();
        let file = temp.path().join("main.js");
        std::fs::write(&file, "v1").unwrap();
        let handle = ResourceHandle::from_file("/main.js", &file);

        std::fs::write(&file, "v2").unwrap();
        assert_eq!(handle.read_content().await.unwrap(), b"v2");
    }

    #[test]
    fn test_set_lookup_and_dedup() {
        let set: ResourceSet = vec![
            ResourceHandle::in_memory("/a.js", b"1".to_vec()),
            ResourceHandle::in_memory("/b.js", b"2".to_vec()),
            ResourceHandle::in_memory("/a.js", b"3".to_vec()),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.len(), 2);
        assert_eq!(set.paths(), vec!["/a.js", "/b.js"]);
        assert!(set.get("/b.js").is_some());
        assert!(set.get("/c.js").is_none());
    }
}
