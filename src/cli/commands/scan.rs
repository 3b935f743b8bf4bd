//! Photo scanning commands: the full pipeline and the pre-flight check.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio::runtime::Runtime;

use crate::capture::{PhotoSource, QualityVerdict, ReadinessState};
use crate::config::Config;
use crate::enrichment::domain::ReleaseDetail;
use crate::error::Error;
use crate::pipeline::{PipelineRunner, ReleaseView};

use super::lookup::{print_bundle, print_entries, print_release};
use super::services::Services;

#[derive(Serialize)]
struct ScanOutput<'a> {
    view: &'a ReleaseView,
    detail: Option<&'a ReleaseDetail>,
}

/// Run the whole pipeline on a photo
pub fn cmd_scan(
    rt: &Runtime,
    config: &Config,
    photo: &Path,
    detail: bool,
    json: bool,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let services = Services::build(config)?;
        let source = Arc::new(services.photo_source(photo));
        let runner = PipelineRunner::new(services.orchestrator(source));
        let mut status = runner.subscribe();

        if !json {
            println!("Scanning: {:?}", photo);
            println!();
        }

        let run = runner.submit();
        let progress = async {
            while status.changed().await.is_ok() {
                let snapshot = status.borrow_and_update().clone();
                if !json && !snapshot.state.is_terminal() {
                    println!("  {}", snapshot.label);
                }
                if snapshot.state.is_terminal() {
                    break;
                }
            }
        };
        let finished = async { tokio::join!(run.join(), progress).0 };
        let outcome = tokio::select! {
            outcome = finished => outcome,
            _ = tokio::signal::ctrl_c() => {
                runner.cancel();
                None
            }
        };

        let view = match outcome {
            Some(Ok(view)) => view,
            Some(Err(e)) => {
                if e.is_retryable() {
                    eprintln!("  The recognition engine could not be reached; try again.");
                }
                return Err(Error::from(e).into());
            }
            None => anyhow::bail!("Scan was cancelled"),
        };

        let release = match view.catalog_results.first() {
            Some(first) if detail => match services.resolver.detail(first.id).await {
                Ok(release) => Some(release),
                Err(e) => {
                    tracing::warn!("Could not fetch release {}: {}", first.id, e);
                    None
                }
            },
            _ => None,
        };

        if json {
            let output = ScanOutput {
                view: &view,
                detail: release.as_ref(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print_view(&view, release.as_ref());
        }
        Ok(())
    })
}

/// Check that a photo is complete and bright enough, without identifying it
pub fn cmd_check(rt: &Runtime, config: &Config, photo: &Path) -> anyhow::Result<()> {
    rt.block_on(async {
        let services = Services::build(config)?;
        let captured = crate::capture::FileSource::new(photo).capture().await?;

        match services.readiness().wait(&captured).await {
            ReadinessState::Stable { size } => println!("✓ File complete ({} bytes)", size),
            state => {
                println!("✗ File not ready ({:?})", state);
                std::process::exit(1);
            }
        }

        match services.config.quality.gate().assess_path(captured.path()).await {
            QualityVerdict::Accepted { brightness } => {
                println!("✓ Brightness {:.1} - ready to identify", brightness);
            }
            QualityVerdict::Rejected(reason) => {
                println!("✗ Rejected: {}", reason);
                std::process::exit(1);
            }
        }
        Ok(())
    })
}

fn print_view(view: &ReleaseView, detail: Option<&ReleaseDetail>) {
    let id = &view.identification;
    println!();
    println!("✓ Found: {} by {}", id.album, id.artist);
    println!("  Spotify: {}", view.album_link.web_url);
    println!();

    match view.catalog_error {
        Some(ref e) => println!("✗ Catalog search failed: {}", e),
        None if view.catalog_results.is_empty() => println!("No catalog matches."),
        None => {
            println!("Catalog matches:");
            print_entries(&view.catalog_results);
        }
    }

    if let Some(release) = detail {
        println!();
        print_release(release);
    }

    println!();
    print_bundle(&view.enrichment);
}
