//! NetWeaver OData repository transport.

mod client;
mod payload;

pub use client::{ODATA_PATH, ODataClient, RepositoryState};
pub use payload::build_payload;
