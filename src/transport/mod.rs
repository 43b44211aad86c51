//! Transport layer: everything that talks to a target system.
//!
//! - [`RemoteStore`]: the per-file seam the sync engine works against
//! - [`adt`]: the ADT file-store client, a [`RemoteStore`]
//! - [`odata`]: the repository service client, which uploads whole archives
//! - [`process`]: the runner for the Cloud Platform command-line tools

pub mod adt;
pub mod odata;

mod archive;
mod http;
mod process;
mod store;

pub use archive::build_archive;
pub use process::{CliCommand, locate_program};
pub use store::{RemoteListing, RemoteStore};

#[cfg(test)]
pub use store::MockRemoteStore;
