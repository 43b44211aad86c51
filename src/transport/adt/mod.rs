//! NetWeaver ADT file-store transport.

mod client;
mod feed;

pub use client::{AdtClient, encode_component};
pub use feed::parse_listing;
