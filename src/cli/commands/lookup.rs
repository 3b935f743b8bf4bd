//! Catalog and recommendation lookup commands, plus the shared printers.

use tokio::runtime::Runtime;

use crate::config::Config;
use crate::enrichment::domain::{CatalogEntry, EnrichmentBundle, ReleaseDetail};
use crate::enrichment::links;
use crate::enrichment::{CatalogQuery, SearchFilters};
use crate::error::ResultExt;

use super::services::Services;

/// How `search` interprets its query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBy {
    Text,
    Barcode,
    CatalogNumber,
}

/// Free-text, barcode or catalog-number search
pub fn cmd_search(
    rt: &Runtime,
    config: &Config,
    query: &str,
    by: SearchBy,
    any_format: bool,
    page: u32,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let services = Services::build(config)?;

        let entries = match by {
            SearchBy::Barcode => {
                println!("Searching barcode {}...", query);
                services.resolver.search_barcode(query).await?
            }
            SearchBy::CatalogNumber => {
                println!("Searching catalog number {}...", query);
                services.resolver.search_catno(query).await?
            }
            SearchBy::Text => {
                let filters = SearchFilters {
                    format: if any_format {
                        None
                    } else {
                        services.resolver.default_filters().format.clone()
                    },
                    page: page.max(1),
                    ..services.resolver.default_filters().clone()
                };
                println!("Searching catalog for \"{}\"...", query);
                services
                    .resolver
                    .search(&CatalogQuery::new(query), &filters)
                    .await?
            }
        };

        println!();
        if entries.is_empty() {
            println!("No results.");
        } else {
            print_entries(&entries);
        }
        Ok(())
    })
}

/// Show a release (or master release) by id
pub fn cmd_release(
    rt: &Runtime,
    config: &Config,
    id: u64,
    master: bool,
    json: bool,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let services = Services::build(config)?;
        let detail = if master {
            services
                .resolver
                .master(id)
                .await
                .with_context(format!("master {}", id))?
        } else {
            services
                .resolver
                .detail(id)
                .await
                .with_context(format!("release {}", id))?
        };

        if json {
            println!("{}", serde_json::to_string_pretty(&detail)?);
        } else {
            print_release(&detail);
        }
        Ok(())
    })
}

/// Similar artists, biography and top tracks for an artist
pub fn cmd_artist(rt: &Runtime, config: &Config, name: &str, json: bool) -> anyhow::Result<()> {
    rt.block_on(async {
        let services = Services::build(config)?;
        services.require_lastfm_key()?;

        let bundle = services.aggregator.enrich(name).await;
        if json {
            println!("{}", serde_json::to_string_pretty(&bundle)?);
        } else {
            print_bundle(&bundle);
        }
        Ok(())
    })
}

// ============================================================================
// Printers
// ============================================================================

pub(super) fn print_entries(entries: &[CatalogEntry]) {
    for (i, entry) in entries.iter().enumerate() {
        let year = entry.year.map(|y| format!(" ({})", y)).unwrap_or_default();
        println!("{:>2}. [{}] {}{}", i + 1, entry.id, entry.title, year);
        if !entry.genres.is_empty() {
            println!("      {}", entry.genres.join(", "));
        }
        if !entry.formats.is_empty() {
            println!("      {}", entry.formats.join("; "));
        }
    }
}

pub(super) fn print_release(detail: &ReleaseDetail) {
    let artists = if detail.artists.is_empty() {
        "Unknown Artist".to_string()
    } else {
        detail.artists.join(", ")
    };
    println!("{} - {}", artists, detail.title);
    if let Some(year) = detail.year {
        println!("  Year:    {}", year);
    }
    if let Some(ref country) = detail.country {
        println!("  Country: {}", country);
    }
    if !detail.genres.is_empty() {
        println!("  Genres:  {}", detail.genres.join(", "));
    }
    if !detail.styles.is_empty() {
        println!("  Styles:  {}", detail.styles.join(", "));
    }
    for label in &detail.labels {
        match label.catalog_number {
            Some(ref catno) => println!("  Label:   {} ({})", label.name, catno),
            None => println!("  Label:   {}", label.name),
        }
    }
    if !detail.formats.is_empty() {
        println!("  Format:  {}", detail.formats.join("; "));
    }
    if let Some(ref community) = detail.community {
        print!("  Community: {} have, {} want", community.have, community.want);
        if let Some(avg) = community.rating_average {
            print!(", rated {:.2}", avg);
        }
        println!();
    }
    if let Some(price) = detail.lowest_price {
        println!(
            "  Lowest price: {:.2} ({} for sale)",
            price,
            detail.num_for_sale.unwrap_or(0)
        );
    }

    if !detail.tracklist.is_empty() {
        println!();
        println!("  Tracklist:");
        for track in &detail.tracklist {
            match track.duration {
                Some(ref d) => println!("    {:<4} {} [{}]", track.position, track.title, d),
                None => println!("    {:<4} {}", track.position, track.title),
            }
        }
    }
    if let Some(ref uri) = detail.uri {
        println!();
        println!("  {}", uri);
    }
}

pub(super) fn print_bundle(bundle: &EnrichmentBundle) {
    println!("Artist: {}", bundle.artist);
    let link = links::artist_link(&bundle.artist);
    println!("  Spotify: {} ({})", link.web_url, link.app_uri);

    if let Some(ref info) = bundle.artist_info {
        if let Some(ref stats) = info.stats {
            println!(
                "  Listeners: {}  Plays: {}",
                stats.listeners, stats.playcount
            );
        }
        if !info.tags.is_empty() {
            println!("  Tags: {}", info.tags.join(", "));
        }
        if let Some(ref bio) = info.bio_summary {
            println!();
            println!("  {}", bio);
        }
    }

    if !bundle.top_tracks.is_empty() {
        println!();
        println!("  Top tracks:");
        for (i, track) in bundle.top_tracks.iter().enumerate() {
            println!("    {}. {} ({} plays)", i + 1, track.name, track.playcount);
            println!("       {}", links::track_link(&track.name, &bundle.artist).web_url);
        }
    }

    if !bundle.similar_artists.is_empty() {
        println!();
        println!("  Similar artists:");
        for artist in &bundle.similar_artists {
            println!("    {:>3.0}%  {}", artist.match_score * 100.0, artist.name);
        }
    }

    for (field, err) in &bundle.field_errors {
        println!("  ✗ {} unavailable: {}", field, err);
    }
}
