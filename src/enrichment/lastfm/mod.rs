//! Last.fm recommendation integration
//!
//! Similar artists, artist biography and top tracks for an artist name.
//! Requires an API key: https://www.last.fm/api/account/create
//!
//! API docs: https://www.last.fm/api

mod adapter;
mod client;
pub mod dto;

pub use client::{DEFAULT_BASE_URL, LastFmClient};
