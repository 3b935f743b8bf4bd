//! Application-wide error types.
//!
//! This module provides a unified error hierarchy for the application.
//! Library modules use specific error types via `thiserror`, while
//! CLI/main uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level application error enum
//! - Module-specific errors (e.g., [`PipelineError`], [`CatalogError`]) for detailed handling
//! - All errors implement `std::error::Error` for compatibility
//!
//! # Example
//!
//! ```ignore
//! use vinyl_scanner::error::{Result, ResultExt};
//!
//! fn read_photo(path: &Path) -> Result<Vec<u8>> {
//!     std::fs::read(path).with_context(format!("reading {}", path.display()))
//! }
//! ```

use crate::config::ConfigError;
use crate::enrichment::CatalogError;
use crate::pipeline::PipelineError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
///
/// Aggregates errors from all subsystems for unified handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Fatal pipeline failure
    #[error("Scan failed: {0}")]
    Pipeline(#[from] PipelineError),

    /// Catalog search or lookup failure
    #[error("{0}")]
    Catalog(#[from] CatalogError),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Missing credential for a remote service
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, CatalogError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Catalog(e).context(ctx))
    }
}
