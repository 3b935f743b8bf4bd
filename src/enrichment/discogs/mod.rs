//! Discogs catalog integration
//!
//! Free-text release search, barcode search, and release/master lookups.
//! A personal access token raises the rate limit but is optional for
//! search-free endpoints.
//!
//! API docs: https://www.discogs.com/developers

mod adapter;
mod client;
pub mod dto;

pub use adapter::{to_catalog_entries, to_release_detail};
pub use client::{DEFAULT_BASE_URL, DiscogsClient};
