//! Command-line interface for vinyl-scanner.
//!
//! This module provides CLI commands for scanning record photos, searching
//! the catalog and looking up artists.

mod commands;

pub use commands::{Cli, Commands, run_command};
