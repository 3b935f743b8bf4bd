//! Last.fm API Data Transfer Objects
//!
//! These types match what the Last.fm 2.0 JSON API returns.
//! DO NOT use these types outside the lastfm module - convert to domain types.
//!
//! Quirks:
//! - Numbers (match scores, play counts) arrive as strings
//! - Single-element lists are sometimes collapsed into a bare object
//! - Errors come back as `{"error": 6, "message": "..."}`, often with HTTP 200

use serde::{Deserialize, Serialize};

/// A number that may be encoded as a JSON string.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Numeric {
    Int(u64),
    Float(f64),
    Text(String),
}

impl Numeric {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Float(f) if *f >= 0.0 => Some(*f as u64),
            Self::Float(_) => None,
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// A list that may be collapsed to a single object.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

/// Error payload returned by any method
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: i64,
    pub message: String,
}

// ============================================================================
// artist.getsimilar
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimilarArtistsResponse {
    pub similarartists: Option<SimilarArtists>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimilarArtists {
    #[serde(default)]
    pub artist: OneOrMany<SimilarArtist>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimilarArtist {
    pub name: String,
    pub mbid: Option<String>,
    /// Similarity score, "0" to "1"
    #[serde(rename = "match")]
    pub match_score: Option<Numeric>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub image: Vec<Image>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Image {
    #[serde(rename = "#text")]
    pub text: String,
    pub size: String,
}

// ============================================================================
// artist.getinfo
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistInfoResponse {
    pub artist: Option<ArtistInfo>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistInfo {
    pub name: String,
    pub mbid: Option<String>,
    pub url: Option<String>,
    pub bio: Option<Bio>,
    pub tags: Option<Tags>,
    pub stats: Option<Stats>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Bio {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Tags {
    #[serde(default)]
    pub tag: OneOrMany<Tag>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Tag {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Stats {
    pub listeners: Option<Numeric>,
    pub playcount: Option<Numeric>,
}

// ============================================================================
// artist.gettoptracks
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TopTracksResponse {
    pub toptracks: Option<TopTracks>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TopTracks {
    #[serde(default)]
    pub track: OneOrMany<Track>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    pub name: String,
    pub playcount: Option<Numeric>,
    pub listeners: Option<Numeric>,
    #[serde(default)]
    pub url: String,
}

// ============================================================================
// CONTRACT TESTS
// ============================================================================
