//! Deployer registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::{TYPE_CLOUD_FOUNDRY, TYPE_NEO, TYPE_NETWEAVER, TYPE_NETWEAVER_ODATA};
use crate::error::{RegistryError, Result};

use super::{CloudFoundryDeployer, Deployer, NeoDeployer, NetWeaverAdtDeployer, NetWeaverODataDeployer};

/// Maps type names to deployers.
///
/// The registry is a plain value: build one, register what you need, and
/// hand it to the entry point.
#[derive(Default)]
pub struct DeployerRegistry {
    deployers: HashMap<String, Arc<dyn Deployer>>,
}

impl DeployerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in deployers.
    #[must_use]
    pub fn with_builtins() -> Self {
        let builtins: [(&str, Arc<dyn Deployer>); 4] = [
            (TYPE_NETWEAVER, Arc::new(NetWeaverAdtDeployer)),
            (TYPE_NETWEAVER_ODATA, Arc::new(NetWeaverODataDeployer)),
            (TYPE_CLOUD_FOUNDRY, Arc::new(CloudFoundryDeployer)),
            (TYPE_NEO, Arc::new(NeoDeployer)),
        ];

        let deployers = builtins
            .into_iter()
            .map(|(name, deployer)| (name.to_string(), deployer))
            .collect();
        Self { deployers }
    }

    /// Registers a deployer under `name`.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateType` if the name is taken.
    pub fn register(&mut self, name: impl Into<String>, deployer: Arc<dyn Deployer>) -> Result<()> {
        let name = name.into();
        if self.deployers.contains_key(&name) {
            return Err(RegistryError::DuplicateType { name }.into());
        }
        self.deployers.insert(name, deployer);
        Ok(())
    }

    /// Looks a deployer up by type name.
    ///
    /// # Errors
    ///
    /// Returns `UnknownType` if nothing is registered under `name`.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Deployer>> {
        self.deployers.get(name).cloned().ok_or_else(|| {
            RegistryError::UnknownType {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Check if a type is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.deployers.contains_key(name)
    }

    /// List all registered type names (sorted).
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.deployers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for DeployerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployerRegistry")
            .field("types", &self.names())
            .finish()
    }
}
