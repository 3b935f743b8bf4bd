//! Internal domain models for catalog lookup and recommendations.
//!
//! These types are OUR types - they don't change when external APIs change.
//! All external API responses get converted into these types via adapters.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

// ============================================================================
// Errors
// ============================================================================

/// Why a remote read failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteFailure {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Any failed catalog call. Carries the underlying cause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Catalog request failed: {cause}")]
pub struct CatalogError {
    pub cause: RemoteFailure,
}

impl From<RemoteFailure> for CatalogError {
    fn from(cause: RemoteFailure) -> Self {
        Self { cause }
    }
}

/// Any failed recommendation call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Recommendation request failed: {cause}")]
pub struct RecommendationError {
    pub cause: RemoteFailure,
}

impl From<RemoteFailure> for RecommendationError {
    fn from(cause: RemoteFailure) -> Self {
        Self { cause }
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Free-text catalog query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub text: String,
}

impl CatalogQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Build a query from a recognized album and artist.
    ///
    /// Placeholder values are kept; catalog search is tolerant of noise.
    pub fn from_album_artist(album: &str, artist: &str) -> Self {
        let text = [album.trim(), artist.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self { text }
    }
}

/// Search constraints sent alongside a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilters {
    /// Result type (release, master, artist, label)
    pub result_type: String,
    /// Physical format constraint; `None` searches all formats
    pub format: Option<String>,
    pub per_page: u32,
    pub page: u32,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            result_type: "release".to_string(),
            format: Some("vinyl".to_string()),
            per_page: 10,
            page: 1,
        }
    }
}

/// One search hit, in the order the catalog returned it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: u64,
    pub title: String,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub styles: Vec<String>,
    pub formats: Vec<String>,
    pub labels: Vec<String>,
    pub country: Option<String>,
    pub cover_image: Option<String>,
    pub thumb: Option<String>,
    pub master_id: Option<u64>,
}

/// Full release record, fetched by id on request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReleaseDetail {
    pub id: u64,
    pub title: String,
    pub artists: Vec<String>,
    pub year: Option<i32>,
    pub released: Option<String>,
    pub genres: Vec<String>,
    pub styles: Vec<String>,
    pub tracklist: Vec<TrackListing>,
    pub images: Vec<ReleaseImage>,
    pub labels: Vec<LabelCredit>,
    pub formats: Vec<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
    pub uri: Option<String>,
    pub community: Option<CommunityStats>,
    pub lowest_price: Option<f64>,
    pub num_for_sale: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackListing {
    pub position: String,
    pub title: String,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseImage {
    pub uri: String,
    pub width: u32,
    pub height: u32,
    pub primary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCredit {
    pub name: String,
    pub catalog_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityStats {
    pub have: u32,
    pub want: u32,
    pub rating_average: Option<f64>,
    pub rating_count: Option<u32>,
}

// ============================================================================
// Recommendations
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarArtist {
    pub name: String,
    /// Similarity to the queried artist (0.0 to 1.0)
    pub match_score: f32,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistInfo {
    pub name: String,
    pub bio_summary: Option<String>,
    pub tags: Vec<String>,
    pub stats: Option<ArtistStats>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArtistStats {
    pub listeners: u64,
    pub playcount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopTrack {
    pub name: String,
    pub playcount: u64,
    pub url: String,
}

/// The three independently fetched parts of an enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentField {
    SimilarArtists,
    ArtistInfo,
    TopTracks,
}

impl fmt::Display for EnrichmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SimilarArtists => "similar artists",
            Self::ArtistInfo => "artist info",
            Self::TopTracks => "top tracks",
        };
        f.write_str(name)
    }
}

/// Partial-success aggregate for one artist.
///
/// Each field is populated or empty on its own; failures are recorded per
/// field and never invalidate the rest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichmentBundle {
    pub artist: String,
    pub similar_artists: Vec<SimilarArtist>,
    pub artist_info: Option<ArtistInfo>,
    pub top_tracks: Vec<TopTrack>,
    #[serde(serialize_with = "serialize_field_errors")]
    pub field_errors: BTreeMap<EnrichmentField, RecommendationError>,
}

impl EnrichmentBundle {
    pub fn empty(artist: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            similar_artists: Vec::new(),
            artist_info: None,
            top_tracks: Vec::new(),
            field_errors: BTreeMap::new(),
        }
    }

    pub fn record_failure(&mut self, field: EnrichmentField, error: RecommendationError) {
        tracing::warn!("Enrichment of {} for '{}' failed: {}", field, self.artist, error);
        self.field_errors.insert(field, error);
    }

    pub fn is_complete(&self) -> bool {
        self.field_errors.is_empty()
    }
}

fn serialize_field_errors<S>(
    errors: &BTreeMap<EnrichmentField, RecommendationError>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_map(errors.iter().map(|(field, err)| (field, err.to_string())))
}
