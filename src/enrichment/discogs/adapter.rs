//! Adapter layer: Convert Discogs DTOs to domain models
//!
//! This is the ONLY place where Discogs DTO types are converted to domain types.

use super::dto;
use crate::enrichment::domain::{
    CatalogEntry, CommunityStats, LabelCredit, ReleaseDetail, ReleaseImage, TrackListing,
};

/// Convert a search response, preserving result order.
pub fn to_catalog_entries(response: dto::SearchResponse) -> Vec<CatalogEntry> {
    response.results.into_iter().map(to_catalog_entry).collect()
}

fn to_catalog_entry(result: dto::SearchResult) -> CatalogEntry {
    CatalogEntry {
        id: result.id,
        title: result.title,
        year: result.year.as_deref().and_then(parse_year),
        genres: result.genre.unwrap_or_default(),
        styles: result.style.unwrap_or_default(),
        formats: result.format.unwrap_or_default(),
        labels: result.label.unwrap_or_default(),
        country: result.country.filter(|c| !c.is_empty()),
        cover_image: result.cover_image.filter(|u| !u.is_empty()),
        thumb: result.thumb.filter(|u| !u.is_empty()),
        master_id: result.master_id.filter(|&id| id != 0),
    }
}

/// Convert a release or master record.
pub fn to_release_detail(release: dto::Release) -> ReleaseDetail {
    ReleaseDetail {
        id: release.id,
        title: release.title,
        artists: release
            .artists
            .into_iter()
            .map(|a| strip_disambiguation(&a.name))
            .collect(),
        year: release.year.filter(|&y| y > 0),
        released: release.released.filter(|r| !r.is_empty()),
        genres: release.genres.unwrap_or_default(),
        styles: release.styles.unwrap_or_default(),
        tracklist: release
            .tracklist
            .unwrap_or_default()
            .into_iter()
            // Headings and index entries are not playable tracks
            .filter(|t| t.type_.as_deref().is_none_or(|kind| kind == "track"))
            .map(|t| TrackListing {
                position: t.position,
                title: t.title,
                duration: t.duration.filter(|d| !d.is_empty()),
            })
            .collect(),
        images: release
            .images
            .unwrap_or_default()
            .into_iter()
            .map(|i| ReleaseImage {
                primary: i.image_type.as_deref() == Some("primary"),
                uri: i.uri,
                width: i.width,
                height: i.height,
            })
            .collect(),
        labels: release
            .labels
            .unwrap_or_default()
            .into_iter()
            .map(|l| LabelCredit {
                name: l.name,
                catalog_number: l.catno.filter(|c| !c.is_empty() && c != "none"),
            })
            .collect(),
        formats: release
            .formats
            .unwrap_or_default()
            .into_iter()
            .map(describe_format)
            .collect(),
        country: release.country.filter(|c| !c.is_empty()),
        notes: release.notes.filter(|n| !n.trim().is_empty()),
        uri: release.uri,
        community: release.community.map(|c| CommunityStats {
            have: c.have,
            want: c.want,
            rating_average: c.rating.as_ref().map(|r| r.average),
            rating_count: c.rating.as_ref().map(|r| r.count),
        }),
        lowest_price: release.lowest_price,
        num_for_sale: release.num_for_sale,
    }
}

/// Parse a Discogs year string; "0" and junk mean unknown.
fn parse_year(year: &str) -> Option<i32> {
    year.trim().parse().ok().filter(|&y| y > 0)
}

/// Discogs appends " (2)" style suffixes to disambiguate artist names.
fn strip_disambiguation(name: &str) -> String {
    if let Some(open) = name.rfind(" (")
        && name.ends_with(')')
        && name[open + 2..name.len() - 1].chars().all(|c| c.is_ascii_digit())
    {
        return name[..open].to_string();
    }
    name.to_string()
}

/// "Vinyl, LP, Album" style format summary.
fn describe_format(format: dto::Format) -> String {
    let mut parts = vec![format.name];
    parts.extend(format.descriptions.unwrap_or_default());
    parts.join(", ")
}
