//! Deployers: one per target type.
//!
//! A [`Deployer`] takes a [`DeployContext`] and brings the target in line
//! with the project's build output. Deployers are looked up by type name in
//! a [`DeployerRegistry`] that the caller owns and passes to
//! [`deploy_project`].

mod cloud_foundry;
mod context;
mod neo;
mod netweaver;
mod registry;
mod run;

pub use cloud_foundry::CloudFoundryDeployer;
pub use context::{DeployContext, DeployOutcome, DeployReport};
pub use neo::NeoDeployer;
pub use netweaver::{NetWeaverAdtDeployer, NetWeaverODataDeployer, preview_adt};
pub use registry::DeployerRegistry;
pub use run::{deploy_project, plan_project};

use async_trait::async_trait;

use crate::error::Result;

/// A deployment strategy for one target type.
#[async_trait]
pub trait Deployer: Send + Sync {
    /// Type name this deployer is registered under.
    fn name(&self) -> &'static str;

    /// Deploys the project described by `context`.
    async fn deploy(&self, context: &DeployContext<'_>) -> Result<DeployOutcome>;
}
