//! Reconciler for synchronizing a remote store with local resources.
//!
//! Drives one deploy through its lifecycle: connect, discover the remote
//! tree, compute the plan, apply it. Any error moves the run to
//! [`SyncPhase::Failed`] and is returned unchanged.

use serde::Serialize;
use std::fmt;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::planner::{CrudPlan, DiffEngine, RemoteRoot, SyncExecutor, SyncReport, discover};
use crate::transport::RemoteStore;
use crate::workspace::ResourceSet;

/// Lifecycle of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    /// Nothing has happened yet.
    Idle,
    /// The store accepted the connection.
    Connected,
    /// The remote tree has been listed.
    ResourcesDiscovered,
    /// The plan is known.
    PlanComputed,
    /// Operations are being applied.
    Syncing,
    /// Every operation succeeded.
    Synced,
    /// A step failed.
    Failed,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connected => "connected",
            Self::ResourcesDiscovered => "resources discovered",
            Self::PlanComputed => "plan computed",
            Self::Syncing => "syncing",
            Self::Synced => "synced",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Reconciler for one remote store.
pub struct Reconciler<'a, S: ?Sized> {
    /// Remote store.
    store: &'a S,
    /// Where discovery starts.
    root: RemoteRoot,
    /// Diff engine.
    diff_engine: DiffEngine,
    /// Current lifecycle phase.
    phase: SyncPhase,
}

/// Result of a reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationResult {
    /// The plan that was applied.
    pub plan: CrudPlan,
    /// What the executor did.
    pub report: SyncReport,
}

impl<'a, S> Reconciler<'a, S>
where
    S: RemoteStore + ?Sized,
{
    /// Creates a new reconciler.
    #[must_use]
    pub fn new(store: &'a S, root: RemoteRoot) -> Self {
        Self {
            store,
            root,
            diff_engine: DiffEngine::new(),
            phase: SyncPhase::Idle,
        }
    }

    /// Replaces the diff engine.
    #[must_use]
    pub const fn with_diff_engine(mut self, diff_engine: DiffEngine) -> Self {
        self.diff_engine = diff_engine;
        self
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Connects, plans and applies the plan.
    ///
    /// # Errors
    ///
    /// Returns the first error of any step unchanged.
    pub async fn reconcile(&mut self, resources: &ResourceSet) -> Result<ReconciliationResult> {
        info!("Starting sync of {} local resources", resources.len());

        let plan = self.preview(resources).await?;

        self.transition(SyncPhase::Syncing);
        let report = SyncExecutor::new(self.store).execute(&plan, resources).await;
        let report = self.track(report)?;
        self.transition(SyncPhase::Synced);

        Ok(ReconciliationResult { plan, report })
    }

    /// Connects and computes the plan without applying it.
    ///
    /// # Errors
    ///
    /// Returns the connection or discovery error unchanged.
    pub async fn preview(&mut self, resources: &ResourceSet) -> Result<CrudPlan> {
        self.phase = SyncPhase::Idle;

        let connected = self.store.connect().await;
        self.track(connected)?;
        self.transition(SyncPhase::Connected);

        let remote = discover(self.store, &self.root).await;
        let remote = self.track(remote)?;
        self.transition(SyncPhase::ResourcesDiscovered);

        let plan = self.diff_engine.compute(&resources.paths(), &remote);
        self.transition(SyncPhase::PlanComputed);
        info!("Plan: {plan}");

        Ok(plan)
    }

    fn transition(&mut self, next: SyncPhase) {
        debug!("Sync phase: {} -> {next}", self.phase);
        self.phase = next;
    }

    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            error!("Sync failed while {}: {e}", self.phase);
            self.phase = SyncPhase::Failed;
        }
        result
    }
}

impl<S: ?Sized> fmt::Debug for Reconciler<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("root", &self.root)
            .field("diff_engine", &self.diff_engine)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DeployerError, TransportError};
    use crate::planner::memory::MemoryStore;
    use crate::transport::MockRemoteStore;
    use crate::workspace::ResourceHandle;

    fn local() -> ResourceSet {
        vec![
            ResourceHandle::in_memory("/index.html", b"<html/>".to_vec()),
            ResourceHandle::in_memory("/js/main.js", b"main".to_vec()),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn test_reconcile_reaches_synced() {
        let store = MemoryStore::new("ZAPP").with_file("/stale.js", "x");
        let mut reconciler = Reconciler::new(&store, store.root());

        let result = reconciler.reconcile(&local()).await.unwrap();

        assert_eq!(reconciler.phase(), SyncPhase::Synced);
        assert_eq!(result.plan.files.delete, vec!["/stale.js"]);
        assert_eq!(result.report.applied_count(), 4);
        assert_eq!(store.files().len(), 2);
    }

    #[tokio::test]
    async fn test_preview_does_not_mutate() {
        let store = MemoryStore::new("ZAPP").with_file("/stale.js", "x");
        let mut reconciler = Reconciler::new(&store, store.root());

        let plan = reconciler.preview(&local()).await.unwrap();

        assert_eq!(reconciler.phase(), SyncPhase::PlanComputed);
        assert_eq!(plan.operation_count(), 4);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_connect_failure_is_fatal() {
        let mut store = MockRemoteStore::new();
        store.expect_connect().times(1).returning(|| {
            Err(DeployerError::Transport(TransportError::AuthenticationFailed {
                url: String::from("https://abap.example.com"),
                message: String::from("401 Unauthorized"),
            }))
        });
        store.expect_list_entries().never();

        let mut reconciler = Reconciler::new(&store, RemoteRoot::new("ZAPP", "ZAPP"));
        let err = reconciler.reconcile(&local()).await.unwrap_err();

        assert!(err.is_pre_sync());
        assert_eq!(reconciler.phase(), SyncPhase::Failed);
    }

    #[tokio::test]
    async fn test_operation_failure_marks_failed() {
        let store = MemoryStore::new("ZAPP")
            .with_file("/stale.js", "x")
            .failing_on("/stale.js");
        let mut reconciler = Reconciler::new(&store, store.root());

        let err = reconciler.reconcile(&local()).await.unwrap_err();

        assert_eq!(err.to_string(), "Transport error: 500 - POST /stale.js: injected failure");
        assert_eq!(reconciler.phase(), SyncPhase::Failed);
    }
}
