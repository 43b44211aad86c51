// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![warn(dead_code)]                   // Unused code is flagged
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![warn(unused_imports)]              // Unused imports are flagged
#![warn(unused_variables)]            // Unused variables are flagged
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// Tests assert with unwrap and panic on unexpected variants.
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

// ============================================================================
// Crate Documentation
// ============================================================================

//! # UI5 Deployer
//!
//! Deploys the build output of a UI5 application to an ABAP NetWeaver
//! system or to SAP Cloud Platform.
//!
//! ## Overview
//!
//! The project file names a deployer type. Each type is a [`deployer::Deployer`]
//! held in a [`deployer::DeployerRegistry`]:
//!
//! - `sap-netweaver`: file-by-file sync through the ADT file store
//! - `sap-netweaver-odata`: one zipped upload through the repository service
//! - `sap-cp-cf`: `cf login` and `cf push`
//! - `sap-cp-neo`: `neo deploy-mta`
//!
//! ## Architecture
//!
//! The NetWeaver ADT path is built around **reconciliation**:
//!
//! 1. **Local resources**: the files under `sourcePath`, minus excludes
//! 2. **Remote resources**: discovered recursively from the BSP application
//! 3. **Plan**: folders and files to create, update and delete, matched by
//!    path suffix
//! 4. **Executor**: applies the plan in a fixed phase order and stops at
//!    the first failure
//!
//! ## Modules
//!
//! - [`config`]: Project file parsing, overrides and validation
//! - [`workspace`]: Local resource listing
//! - [`planner`]: Discovery, diff computation and plan execution
//! - [`reconciler`]: Sync lifecycle for one remote store
//! - [`transport`]: ADT and OData clients, archives, subprocesses
//! - [`deployer`]: Deployer types, registry and entry point
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! metadata:
//!   name: my.app
//! deployer:
//!   type: sap-netweaver
//!   sourcePath: dist
//!   connection:
//!     url: https://abap.example.com
//!   credentials:
//!     username: DEVELOPER
//!     password: secret
//!   abapRepository:
//!     client: "100"
//!     transportRequest: DEVK900001
//!     package: ZUI5
//!     bspApplication: ZMYAPP
//!   resources:
//!     excludes:
//!       - "dist/test/**"
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod deployer;
pub mod error;
pub mod planner;
pub mod reconciler;
pub mod transport;
pub mod workspace;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ConfigParser, ConfigValidator, DeployConfig};
pub use deployer::{DeployReport, Deployer, DeployerRegistry, deploy_project, plan_project};
pub use error::{DeployerError, Result};
pub use planner::{CrudPlan, DiffEngine, MatchPredicate, SyncExecutor};
pub use reconciler::{ReconciliationResult, Reconciler, SyncPhase};
pub use transport::RemoteStore;
pub use workspace::{LocalWorkspace, ResourceSet};
