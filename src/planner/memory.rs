//! In-memory remote store for engine tests.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use crate::error::{DeployerError, Result, TransportError};
use crate::transport::{RemoteListing, RemoteStore};

use super::discovery::RemoteRoot;
use super::paths::normalize_remote_path;

/// A remote store backed by maps, recording every mutating call.
#[derive(Debug, Default)]
pub struct MemoryStore {
    app: String,
    state: Mutex<State>,
    fail_on: Option<String>,
}

#[derive(Debug, Default)]
struct State {
    folders: BTreeSet<String>,
    files: BTreeMap<String, Vec<u8>>,
    calls: Vec<String>,
}

impl MemoryStore {
    pub fn new(app: &str) -> Self {
        Self {
            app: app.to_string(),
            ..Self::default()
        }
    }

    /// Seeds a file and its parent folders.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let mut parts: Vec<&str> = path.split('/').collect();
            while parts.len() > 2 {
                parts.pop();
                state.folders.insert(parts.join("/"));
            }
            state.files.insert(path.to_string(), content.as_bytes().to_vec());
        }
        self
    }

    /// Makes every call on `path` fail.
    pub fn failing_on(mut self, path: &str) -> Self {
        self.fail_on = Some(path.to_string());
        self
    }

    pub fn root(&self) -> RemoteRoot {
        RemoteRoot::new(self.app.clone(), self.app.clone())
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn folders(&self) -> Vec<String> {
        self.state.lock().unwrap().folders.iter().cloned().collect()
    }

    pub fn files(&self) -> BTreeMap<String, Vec<u8>> {
        self.state.lock().unwrap().files.clone()
    }

    fn id(&self, path: &str) -> String {
        format!("{}{}", self.app, path.replace('/', "%2f"))
    }

    fn record(&self, call: String, path: &str) -> Result<std::sync::MutexGuard<'_, State>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if self.fail_on.as_deref() == Some(path) {
            return Err(DeployerError::Transport(TransportError::request(
                "POST", path, 500, "injected failure",
            )));
        }
        Ok(state)
    }
}

fn parent(path: &str) -> &str {
    path.rfind('/').map_or("", |i| &path[..i])
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn connect(&self) -> Result<()> {
        Ok(())
    }

    async fn list_entries(&self, folder_id: &str) -> Result<RemoteListing> {
        let folder = normalize_remote_path(folder_id, &self.app);
        let state = self.state.lock().unwrap();
        Ok(RemoteListing {
            folders: state
                .folders
                .iter()
                .filter(|f| parent(f) == folder)
                .map(|f| self.id(f))
                .collect(),
            files: state
                .files
                .keys()
                .filter(|f| parent(f) == folder)
                .map(|f| self.id(f))
                .collect(),
        })
    }

    async fn create_folder(&self, path: &str) -> Result<()> {
        let mut state = self.record(format!("create folder {path}"), path)?;
        if !parent(path).is_empty() && !state.folders.contains(parent(path)) {
            return Err(DeployerError::Transport(TransportError::request(
                "POST", path, 404, "parent folder missing",
            )));
        }
        state.folders.insert(path.to_string());
        Ok(())
    }

    async fn delete_folder(&self, path: &str) -> Result<()> {
        let mut state = self.record(format!("delete folder {path}"), path)?;
        let below = format!("{path}/");
        state.folders.retain(|f| f != path && !f.starts_with(&below));
        state.files.retain(|f, _| !f.starts_with(&below));
        Ok(())
    }

    async fn create_file(&self, path: &str, content: &[u8]) -> Result<()> {
        let mut state = self.record(format!("create file {path}"), path)?;
        if !parent(path).is_empty() && !state.folders.contains(parent(path)) {
            return Err(DeployerError::Transport(TransportError::request(
                "POST", path, 404, "parent folder missing",
            )));
        }
        state.files.insert(path.to_string(), content.to_vec());
        Ok(())
    }

    async fn update_file(&self, path: &str, content: &[u8]) -> Result<()> {
        let mut state = self.record(format!("update file {path}"), path)?;
        state.files.insert(path.to_string(), content.to_vec());
        Ok(())
    }

    async fn delete_file(&self, path: &str) -> Result<()> {
        let mut state = self.record(format!("delete file {path}"), path)?;
        state.files.remove(path);
        Ok(())
    }
}
