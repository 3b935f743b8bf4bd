//! Adapter layer: Convert Last.fm DTOs to domain models
//!
//! This is the ONLY place where Last.fm DTO types are converted to domain types.

use super::dto;
use crate::enrichment::domain::{ArtistInfo, ArtistStats, SimilarArtist, TopTrack};

pub fn to_similar_artists(response: dto::SimilarArtistsResponse) -> Vec<SimilarArtist> {
    response
        .similarartists
        .map(|s| s.artist.into_vec())
        .unwrap_or_default()
        .into_iter()
        .map(|a| SimilarArtist {
            match_score: a
                .match_score
                .as_ref()
                .and_then(dto::Numeric::as_f64)
                .map(|m| m.clamp(0.0, 1.0) as f32)
                .unwrap_or(0.0),
            name: a.name,
            url: a.url,
        })
        .collect()
}

pub fn to_artist_info(response: dto::ArtistInfoResponse) -> Option<ArtistInfo> {
    let artist = response.artist?;

    Some(ArtistInfo {
        name: artist.name,
        bio_summary: artist
            .bio
            .map(|b| strip_read_more(&b.summary))
            .filter(|s| !s.is_empty()),
        tags: artist
            .tags
            .map(|t| t.tag.into_vec().into_iter().map(|tag| tag.name).collect())
            .unwrap_or_default(),
        stats: artist.stats.map(|s| ArtistStats {
            listeners: s.listeners.as_ref().and_then(dto::Numeric::as_u64).unwrap_or(0),
            playcount: s.playcount.as_ref().and_then(dto::Numeric::as_u64).unwrap_or(0),
        }),
        url: artist.url.filter(|u| !u.is_empty()),
    })
}

pub fn to_top_tracks(response: dto::TopTracksResponse) -> Vec<TopTrack> {
    response
        .toptracks
        .map(|t| t.track.into_vec())
        .unwrap_or_default()
        .into_iter()
        .map(|t| TopTrack {
            playcount: t.playcount.as_ref().and_then(dto::Numeric::as_u64).unwrap_or(0),
            name: t.name,
            url: t.url,
        })
        .collect()
}

/// Biography summaries end with a "Read more on Last.fm" anchor.
fn strip_read_more(summary: &str) -> String {
    let text = match summary.find("<a href") {
        Some(idx) => &summary[..idx],
        None => summary,
    };
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_read_more() {
        assert_eq!(
            strip_read_more("A band. <a href=\"https://last.fm\">Read more on Last.fm</a>"),
            "A band."
        );
        assert_eq!(strip_read_more("Plain bio"), "Plain bio");
        assert_eq!(strip_read_more(" <a href=\"x\">Read more</a>"), "");
    }

    #[test]
    fn test_missing_sections_are_empty() {
        assert!(to_similar_artists(dto::SimilarArtistsResponse { similarartists: None }).is_empty());
        assert!(to_artist_info(dto::ArtistInfoResponse { artist: None }).is_none());
        assert!(to_top_tracks(dto::TopTracksResponse { toptracks: None }).is_empty());
    }

    #[test]
    fn test_similar_artist_scores_are_clamped() {
        let response = dto::SimilarArtistsResponse {
            similarartists: Some(dto::SimilarArtists {
                artist: dto::OneOrMany::Many(vec![
                    dto::SimilarArtist {
                        name: "A".to_string(),
                        mbid: None,
                        match_score: Some(dto::Numeric::Text("1.2".to_string())),
                        url: "u".to_string(),
                        image: vec![],
                    },
                    dto::SimilarArtist {
                        name: "B".to_string(),
                        mbid: None,
                        match_score: None,
                        url: "v".to_string(),
                        image: vec![],
                    },
                ]),
            }),
        };
        let artists = to_similar_artists(response);
        assert_eq!(artists[0].match_score, 1.0);
        assert_eq!(artists[1].match_score, 0.0);
    }

    #[test]
    fn test_artist_info_conversion() {
        let response: dto::ArtistInfoResponse = serde_json::from_str(
            r#"{"artist": {"name": "Low", "url": "", "bio": {"summary": "Slowcore trio. <a href=\"x\">Read more</a>"},
                "tags": {"tag": [{"name": "slowcore"}]}, "stats": {"listeners": "400000", "playcount": "not-a-number"}}}"#,
        )
        .unwrap();

        let info = to_artist_info(response).unwrap();

        assert_eq!(info.bio_summary.as_deref(), Some("Slowcore trio."));
        assert_eq!(info.tags, vec!["slowcore"]);
        assert_eq!(
            info.stats,
            Some(ArtistStats {
                listeners: 400000,
                playcount: 0
            })
        );
        assert!(info.url.is_none());
    }
}
