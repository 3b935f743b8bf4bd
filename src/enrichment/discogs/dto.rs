//! Discogs API Data Transfer Objects
//!
//! These types match what the Discogs API returns.
//! DO NOT use these types outside the discogs module - convert to domain types.
//!
//! API Reference: https://www.discogs.com/developers#page:database

use serde::{Deserialize, Serialize};

/// `GET /database/search` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResult {
    pub id: u64,
    #[serde(rename = "type")]
    pub result_type: Option<String>,
    pub title: String,
    pub cover_image: Option<String>,
    pub thumb: Option<String>,
    /// Year as a string ("1969"); absent for undated releases
    pub year: Option<String>,
    pub format: Option<Vec<String>>,
    pub label: Option<Vec<String>>,
    pub genre: Option<Vec<String>>,
    pub style: Option<Vec<String>>,
    pub country: Option<String>,
    pub master_id: Option<u64>,
    pub master_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub pages: u32,
    pub per_page: u32,
    pub items: u32,
}

/// `GET /releases/{id}` and `GET /masters/{id}` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Release {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    /// Masters and undated releases report 0
    pub year: Option<i32>,
    pub released: Option<String>,
    pub genres: Option<Vec<String>>,
    pub styles: Option<Vec<String>>,
    pub tracklist: Option<Vec<Track>>,
    pub images: Option<Vec<Image>>,
    pub labels: Option<Vec<Label>>,
    pub formats: Option<Vec<Format>>,
    pub country: Option<String>,
    pub notes: Option<String>,
    pub uri: Option<String>,
    pub community: Option<Community>,
    pub lowest_price: Option<f64>,
    pub num_for_sale: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Artist {
    pub name: String,
    pub id: u64,
    pub resource_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    pub position: String,
    pub title: String,
    pub duration: Option<String>,
    pub type_: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Image {
    pub uri: String,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub width: u32,
    #[serde(rename = "type")]
    pub image_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Label {
    pub name: String,
    pub catno: Option<String>,
    pub id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Format {
    pub name: String,
    pub qty: Option<String>,
    pub descriptions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Community {
    pub rating: Option<Rating>,
    #[serde(default)]
    pub want: u32,
    #[serde(default)]
    pub have: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Rating {
    pub average: f64,
    pub count: u32,
}

/// Error response from the Discogs API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub message: String,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// ============================================================================

#[cfg(test)]
mod contract_tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let json = r#"{
            "pagination": {"page": 1, "pages": 12, "per_page": 10, "items": 115, "urls": {}},
            "results": [{
                "id": 123,
                "type": "release",
                "title": "The Beatles - Abbey Road",
                "year": "1969",
                "format": ["Vinyl", "LP", "Album"],
                "label": ["Apple Records"],
                "genre": ["Rock"],
                "style": ["Pop Rock"],
                "country": "UK",
                "cover_image": "https://img.discogs.com/abbey.jpg",
                "thumb": "https://img.discogs.com/abbey-thumb.jpg",
                "master_id": 24047,
                "master_url": "https://api.discogs.com/masters/24047",
                "community": {"want": 1, "have": 2}
            }]
        }"#;

        let response: SearchResponse =
            serde_json::from_str(json).expect("Should parse search response");

        assert_eq!(response.results.len(), 1);
        let result = &response.results[0];
        assert_eq!(result.id, 123);
        assert_eq!(result.year.as_deref(), Some("1969"));
        assert_eq!(result.genre.as_ref().unwrap()[0], "Rock");
        assert_eq!(response.pagination.unwrap().items, 115);
    }

    #[test]
    fn test_parse_sparse_search_result() {
        let json = r#"{"results": [{"id": 9, "title": "Untitled"}]}"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        assert!(response.results[0].year.is_none());
        assert!(response.results[0].genre.is_none());
        assert!(response.pagination.is_none());
    }

    #[test]
    fn test_parse_release() {
        let json = r#"{
            "id": 123,
            "title": "Abbey Road",
            "artists": [{"name": "The Beatles", "id": 82730, "resource_url": "https://api.discogs.com/artists/82730"}],
            "year": 1969,
            "released": "1969-09-26",
            "genres": ["Rock"],
            "styles": ["Pop Rock"],
            "tracklist": [
                {"position": "A1", "title": "Come Together", "duration": "4:20", "type_": "track"},
                {"position": "A2", "title": "Something", "duration": "3:03", "type_": "track"}
            ],
            "images": [{"uri": "https://img.discogs.com/front.jpg", "height": 600, "width": 600, "type": "primary"}],
            "labels": [{"name": "Apple Records", "catno": "PCS 7088", "id": 25988}],
            "formats": [{"name": "Vinyl", "qty": "1", "descriptions": ["LP", "Album"]}],
            "country": "UK",
            "notes": "Gatefold sleeve.",
            "uri": "https://www.discogs.com/release/123",
            "community": {"rating": {"average": 4.7, "count": 2100}, "want": 9000, "have": 21000},
            "lowest_price": 24.5,
            "num_for_sale": 310
        }"#;

        let release: Release = serde_json::from_str(json).expect("Should parse release");

        assert_eq!(release.artists[0].name, "The Beatles");
        assert_eq!(release.tracklist.as_ref().unwrap().len(), 2);
        assert_eq!(release.community.as_ref().unwrap().rating.as_ref().unwrap().count, 2100);
        assert_eq!(release.lowest_price, Some(24.5));
    }

    #[test]
    fn test_parse_api_error() {
        let error: ApiError = serde_json::from_str(r#"{"message": "Release not found."}"#).unwrap();
        assert_eq!(error.message, "Release not found.");
    }
}
