//! Last.fm HTTP client
//!
//! All methods are GETs against the single `/2.0/` endpoint, selected by the
//! `method` query parameter. Errors may arrive with HTTP 200, so the body is
//! checked for an error payload before decoding.

use serde::de::DeserializeOwned;

use super::{adapter, dto};
use crate::enrichment::domain::{
    ArtistInfo, RecommendationError, RemoteFailure, SimilarArtist, TopTrack,
};
use crate::enrichment::http;

pub const DEFAULT_BASE_URL: &str = "https://ws.audioscrobbler.com/2.0/";

/// Last.fm API client
pub struct LastFmClient {
    api_key: String,
    http_client: reqwest::Client,
    base_url: String,
    similar_limit: u32,
    top_tracks_limit: u32,
}

impl LastFmClient {
    pub fn new(http_client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self::with_base_url(http_client, api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        http_client: reqwest::Client,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            http_client,
            base_url: base_url.into(),
            similar_limit: 10,
            top_tracks_limit: 5,
        }
    }

    /// Override how many similar artists and top tracks are requested.
    pub fn with_limits(mut self, similar: u32, top_tracks: u32) -> Self {
        self.similar_limit = similar;
        self.top_tracks_limit = top_tracks;
        self
    }

    pub async fn similar_artists(
        &self,
        artist: &str,
    ) -> Result<Vec<SimilarArtist>, RecommendationError> {
        let url = self.method_url("artist.getsimilar", artist, Some(self.similar_limit));
        let response: dto::SimilarArtistsResponse = self.get(&url).await?;
        Ok(adapter::to_similar_artists(response))
    }

    pub async fn artist_info(&self, artist: &str) -> Result<Option<ArtistInfo>, RecommendationError> {
        let url = self.method_url("artist.getinfo", artist, None);
        let response: dto::ArtistInfoResponse = self.get(&url).await?;
        Ok(adapter::to_artist_info(response))
    }

    pub async fn top_tracks(&self, artist: &str) -> Result<Vec<TopTrack>, RecommendationError> {
        let url = self.method_url("artist.gettoptracks", artist, Some(self.top_tracks_limit));
        let response: dto::TopTracksResponse = self.get(&url).await?;
        Ok(adapter::to_top_tracks(response))
    }

    fn method_url(&self, method: &str, artist: &str, limit: Option<u32>) -> String {
        let mut url = format!(
            "{}?method={}&artist={}&api_key={}&format=json",
            self.base_url,
            method,
            urlencoding::encode(artist),
            urlencoding::encode(&self.api_key)
        );
        if let Some(limit) = limit {
            url.push_str(&format!("&limit={}", limit));
        }
        url
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, RemoteFailure> {
        if !self.api_key.is_empty() {
            tracing::debug!("Last.fm GET {}", url.replace(&self.api_key, "***"));
        }

        let (status, body) = http::send(self.http_client.get(url)).await?;

        if let Ok(error) = serde_json::from_str::<dto::ApiError>(&body) {
            return Err(RemoteFailure::Api {
                code: error.error,
                message: error.message,
            });
        }

        if !status.is_success() {
            return Err(http::status_failure(status, &body));
        }

        http::decode(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> LastFmClient {
        LastFmClient::new(reqwest::Client::new(), "test-key")
    }

    #[test]
    fn test_client_creation() {
        let client = client();
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.base_url, "https://ws.audioscrobbler.com/2.0/");
        assert_eq!(client.similar_limit, 10);
        assert_eq!(client.top_tracks_limit, 5);
    }

    #[test]
    fn test_similar_url() {
        let url = client().method_url("artist.getsimilar", "The Beatles", Some(10));
        assert_eq!(
            url,
            "https://ws.audioscrobbler.com/2.0/?method=artist.getsimilar&artist=The%20Beatles&api_key=test-key&format=json&limit=10"
        );
    }

    #[test]
    fn test_info_url_has_no_limit() {
        let url = client().method_url("artist.getinfo", "Sigur Rós", None);
        assert!(url.contains("artist=Sigur%20R%C3%B3s"));
        assert!(!url.contains("limit="));
    }

    #[test]
    fn test_with_limits() {
        let client = client().with_limits(20, 3);
        let url = client.method_url("artist.gettoptracks", "X", Some(client.top_tracks_limit));
        assert!(url.ends_with("&limit=3"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_recommendation_error() {
        let client =
            LastFmClient::with_base_url(reqwest::Client::new(), "k", "http://127.0.0.1:9/2.0/");
        let err = client.top_tracks("X").await.unwrap_err();
        assert!(matches!(err.cause, RemoteFailure::Network(_)));
    }
}
