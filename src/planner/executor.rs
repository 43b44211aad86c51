//! Plan executor for applying sync plans.
//!
//! Operations run one at a time in the order given by
//! [`CrudPlan::operations`]. The first failure stops the sync and is
//! returned as is; operations already applied stay applied.

use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::error::Result;
use crate::transport::RemoteStore;
use crate::workspace::ResourceSet;

use super::plan::{CrudPlan, OperationKind, SyncOperation};

/// Executor for sync plans.
#[derive(Debug)]
pub struct SyncExecutor<'a, S: ?Sized> {
    /// Remote store receiving the operations.
    store: &'a S,
}

/// Result of a completed sync.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    /// Operations applied, in order.
    pub applied: Vec<SyncOperation>,
    /// File operations skipped because no local resource backs them.
    pub skipped: Vec<SyncOperation>,
    /// Wall time spent applying the plan.
    pub elapsed: Duration,
}

impl<'a, S> SyncExecutor<'a, S>
where
    S: RemoteStore + ?Sized,
{
    /// Creates a new executor.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Applies the plan.
    ///
    /// File content is read from `resources` right before each upload.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing operation unchanged.
    pub async fn execute(&self, plan: &CrudPlan, resources: &ResourceSet) -> Result<SyncReport> {
        let started = Instant::now();
        let mut report = SyncReport::default();
        let operations = plan.operations();

        info!("Applying {} operations", operations.len());

        for operation in operations {
            debug!("Applying: {operation}");
            match self.apply(&operation, resources).await {
                Ok(true) => report.applied.push(operation),
                Ok(false) => {
                    debug!("No local resource for {}, skipping", operation.path);
                    report.skipped.push(operation);
                }
                Err(e) => {
                    error!("Sync aborted at '{operation}': {e}");
                    return Err(e);
                }
            }
        }

        report.elapsed = started.elapsed();
        info!(
            "Applied {} operations in {:.2?}",
            report.applied.len(),
            report.elapsed
        );
        Ok(report)
    }

    /// Applies one operation. Returns false if it was skipped.
    async fn apply(&self, operation: &SyncOperation, resources: &ResourceSet) -> Result<bool> {
        let path = operation.path.as_str();

        match operation.kind {
            OperationKind::DeleteFile => self.store.delete_file(path).await?,
            OperationKind::DeleteFolder => self.store.delete_folder(path).await?,
            OperationKind::CreateFolder => self.store.create_folder(path).await?,
            OperationKind::UpdateFile | OperationKind::CreateFile => {
                let Some(resource) = resources.get(path) else {
                    return Ok(false);
                };
                let content = resource.read_content().await?;
                if operation.kind == OperationKind::UpdateFile {
                    self.store.update_file(path, &content).await?;
                } else {
                    self.store.create_file(path, &content).await?;
                }
            }
        }

        Ok(true)
    }
}

impl SyncReport {
    /// Returns the number of operations applied.
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    /// Returns the number of applied operations of one kind.
    #[must_use]
    pub fn count(&self, kind: OperationKind) -> usize {
        self.applied.iter().filter(|op| op.kind == kind).count()
    }
}
