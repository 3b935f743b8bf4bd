//! CLI command definitions and dispatch.
//!
//! This module provides the command-line interface for Vinyl Scanner.
//! Each group of subcommands is implemented in its own submodule:
//! - `scan`: Full pipeline on a photo, and the readiness/quality pre-check
//! - `lookup`: Catalog search, release details and artist enrichment
//! - `services`: Wiring clients, engine and pipeline from configuration

mod lookup;
mod scan;
mod services;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config::{self, Config};

pub use lookup::{SearchBy, cmd_artist, cmd_release, cmd_search};
pub use scan::{cmd_check, cmd_scan};

/// Vinyl Scanner CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: OS config dir/vinyl-scanner/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Discogs personal access token (or set DISCOGS_TOKEN env var)
    #[arg(long, global = true, env = "DISCOGS_TOKEN", hide_env_values = true)]
    pub discogs_token: Option<String>,

    /// Last.fm API key (or set LASTFM_API_KEY env var)
    #[arg(long, global = true, env = "LASTFM_API_KEY", hide_env_values = true)]
    pub lastfm_key: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Identify a record from a photo and show catalog matches and artist info
    Scan {
        /// Path to the photo
        photo: PathBuf,
        /// Also fetch full details for the first catalog match
        #[arg(long)]
        detail: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that a photo is complete and bright enough to identify
    Check {
        /// Path to the photo
        photo: PathBuf,
    },
    /// Search the catalog
    Search {
        /// Search text (album, artist, or both)
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Treat the query as a barcode
        #[arg(long, conflicts_with = "catno")]
        barcode: bool,
        /// Treat the query as a label catalog number
        #[arg(long)]
        catno: bool,
        /// Don't restrict results to vinyl
        #[arg(long)]
        any_format: bool,
        /// Result page
        #[arg(long, default_value = "1")]
        page: u32,
    },
    /// Show a release by catalog id
    Release {
        /// Release id
        id: u64,
        /// Treat the id as a master release
        #[arg(long)]
        master: bool,
        /// Print the release as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show similar artists, biography and top tracks
    Artist {
        /// Artist name
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

/// Run the specified CLI command.
///
/// Returns `Ok(true)` if a command was run, `Ok(false)` if no command was specified.
pub fn run_command(cli: &Cli) -> anyhow::Result<bool> {
    let Some(ref command) = cli.command else {
        return Ok(false);
    };

    let config = effective_config(cli);
    let rt = Runtime::new()?;

    match command {
        Commands::Scan {
            photo,
            detail,
            json,
        } => cmd_scan(&rt, &config, photo, *detail, *json)?,
        Commands::Check { photo } => cmd_check(&rt, &config, photo)?,
        Commands::Search {
            query,
            barcode,
            catno,
            any_format,
            page,
        } => {
            let by = match (*barcode, *catno) {
                (true, _) => SearchBy::Barcode,
                (_, true) => SearchBy::CatalogNumber,
                _ => SearchBy::Text,
            };
            cmd_search(&rt, &config, &query.join(" "), by, *any_format, *page)?
        }
        Commands::Release { id, master, json } => cmd_release(&rt, &config, *id, *master, *json)?,
        Commands::Artist { name, json } => cmd_artist(&rt, &config, &name.join(" "), *json)?,
        Commands::Config { save } => cmd_config(cli, &config, *save)?,
    }
    Ok(true)
}

/// Config file merged with credentials given on the command line or environment.
fn effective_config(cli: &Cli) -> Config {
    let mut config = match cli.config {
        Some(ref path) => config::load_from(path),
        None => config::load(),
    };
    config
        .credentials
        .override_with(cli.discogs_token.as_deref(), cli.lastfm_key.as_deref());
    config
}

/// Print (and optionally save) the effective configuration
fn cmd_config(cli: &Cli, config: &Config, save: bool) -> anyhow::Result<()> {
    let path = cli.config.clone().or_else(config::config_path);
    match path {
        Some(ref path) => println!("# {}", path.display()),
        None => println!("# (no config directory)"),
    }

    // Never echo secrets
    let mut shown = config.clone();
    for secret in [
        &mut shown.credentials.discogs_token,
        &mut shown.credentials.lastfm_api_key,
    ] {
        if secret.is_some() {
            *secret = Some("********".to_string());
        }
    }
    println!("{}", toml::to_string_pretty(&shown)?);

    if save {
        match path {
            Some(ref path) => config::save_to(config, path)?,
            None => config::save(config)?,
        }
        println!("✓ Saved");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan() {
        let cli = Cli::try_parse_from(["vinyl-scanner", "scan", "cover.jpg", "--detail"]).unwrap();
        match cli.command {
            Some(Commands::Scan {
                photo,
                detail,
                json,
            }) => {
                assert_eq!(photo, PathBuf::from("cover.jpg"));
                assert!(detail);
                assert!(!json);
            }
            _ => panic!("expected scan"),
        }
    }

    #[test]
    fn test_parse_search_joins_words() {
        let cli = Cli::try_parse_from(["vinyl-scanner", "search", "Abbey", "Road"]).unwrap();
        match cli.command {
            Some(Commands::Search { query, page, .. }) => {
                assert_eq!(query.join(" "), "Abbey Road");
                assert_eq!(page, 1);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_parse_search_by_catalog_number() {
        let cli =
            Cli::try_parse_from(["vinyl-scanner", "search", "--catno", "PCS", "7088"]).unwrap();
        match cli.command {
            Some(Commands::Search {
                query,
                catno,
                barcode,
                ..
            }) => {
                assert_eq!(query.join(" "), "PCS 7088");
                assert!(catno);
                assert!(!barcode);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_barcode_and_catno_conflict() {
        let result =
            Cli::try_parse_from(["vinyl-scanner", "search", "--barcode", "--catno", "123"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flag_credentials_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[credentials]\ndiscogs_token = \"file\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "vinyl-scanner",
            "--config",
            path.to_str().unwrap(),
            "--discogs-token",
            "flag",
            "config",
        ])
        .unwrap();
        let config = effective_config(&cli);
        assert_eq!(config.credentials.discogs_token.as_deref(), Some("flag"));
    }

    #[test]
    fn test_no_command() {
        let cli = Cli::try_parse_from(["vinyl-scanner"]).unwrap();
        assert!(!run_command(&cli).unwrap());
    }
}
