//! Discogs HTTP client
//!
//! Handles communication with the Discogs web service.
//! See: https://www.discogs.com/developers
//!
//! IMPORTANT: Discogs requires a User-Agent header. Authenticated requests
//! send `Authorization: Discogs token=<token>`.
//!
//! Every call is a fresh round trip: no retries, no caching.

use super::{adapter, dto};
use crate::enrichment::domain::{
    CatalogEntry, CatalogError, CatalogQuery, ReleaseDetail, RemoteFailure, SearchFilters,
};
use crate::enrichment::http;

pub const DEFAULT_BASE_URL: &str = "https://api.discogs.com";

/// Discogs API client
pub struct DiscogsClient {
    http_client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl DiscogsClient {
    /// Create a client against the public API.
    pub fn new(http_client: reqwest::Client, token: Option<String>) -> Self {
        Self::with_base_url(http_client, token, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom base URL (mirrors, tests)
    pub fn with_base_url(
        http_client: reqwest::Client,
        token: Option<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// Free-text release search. Results keep the server's order.
    pub async fn search(
        &self,
        query: &CatalogQuery,
        filters: &SearchFilters,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        let response: dto::SearchResponse = self.get(&self.search_url(query, filters)).await?;
        Ok(adapter::to_catalog_entries(response))
    }

    /// Search releases by barcode.
    pub async fn search_barcode(&self, barcode: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        let response: dto::SearchResponse =
            self.get(&self.identifier_url("barcode", barcode)).await?;
        Ok(adapter::to_catalog_entries(response))
    }

    /// Search releases by the label's catalog number (e.g. "PCS 7088").
    pub async fn search_catno(&self, catno: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        let response: dto::SearchResponse = self.get(&self.identifier_url("catno", catno)).await?;
        Ok(adapter::to_catalog_entries(response))
    }

    /// Fetch a release by id.
    pub async fn release(&self, release_id: u64) -> Result<ReleaseDetail, CatalogError> {
        let url = format!("{}/releases/{}", self.base_url, release_id);
        let release: dto::Release = self.get(&url).await?;
        Ok(adapter::to_release_detail(release))
    }

    /// Fetch a master release (the canonical version across pressings).
    pub async fn master(&self, master_id: u64) -> Result<ReleaseDetail, CatalogError> {
        let url = format!("{}/masters/{}", self.base_url, master_id);
        let release: dto::Release = self.get(&url).await?;
        Ok(adapter::to_release_detail(release))
    }

    /// Release search on a single identifier field.
    fn identifier_url(&self, field: &str, value: &str) -> String {
        format!(
            "{}/database/search?{}={}&type=release",
            self.base_url,
            field,
            urlencoding::encode(value.trim())
        )
    }

    fn search_url(&self, query: &CatalogQuery, filters: &SearchFilters) -> String {
        let mut url = format!(
            "{}/database/search?q={}&type={}&per_page={}&page={}",
            self.base_url,
            urlencoding::encode(&query.text),
            urlencoding::encode(&filters.result_type),
            filters.per_page,
            filters.page
        );
        if let Some(ref format) = filters.format {
            url.push_str("&format=");
            url.push_str(&urlencoding::encode(format));
        }
        url
    }

    /// Send the HTTP request and parse the response
    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, RemoteFailure> {
        tracing::debug!("Discogs GET {}", url);

        let mut request = self.http_client.get(url);
        if let Some(ref token) = self.token {
            request = request.header(
                reqwest::header::AUTHORIZATION,
                format!("Discogs token={}", token),
            );
        }

        let (status, body) = http::send(request).await?;

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<dto::ApiError>(&body) {
                return Err(RemoteFailure::Status {
                    status: status.as_u16(),
                    message: error.message,
                });
            }
            return Err(http::status_failure(status, &body));
        }

        http::decode(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> DiscogsClient {
        DiscogsClient::new(reqwest::Client::new(), Some("secret".to_string()))
    }

    #[test]
    fn test_client_creation() {
        let client = client();
        assert_eq!(client.base_url, "https://api.discogs.com");
        assert_eq!(client.token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_empty_token_is_ignored() {
        let client = DiscogsClient::new(reqwest::Client::new(), Some(String::new()));
        assert!(client.token.is_none());
    }

    #[test]
    fn test_client_with_custom_url() {
        let client =
            DiscogsClient::with_base_url(reqwest::Client::new(), None, "http://localhost:8080/");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_search_url_default_filters() {
        let url = client().search_url(
            &CatalogQuery::new("Abbey Road The Beatles"),
            &SearchFilters::default(),
        );
        assert_eq!(
            url,
            "https://api.discogs.com/database/search?q=Abbey%20Road%20The%20Beatles&type=release&per_page=10&page=1&format=vinyl"
        );
    }

    #[test]
    fn test_search_url_without_format() {
        let filters = SearchFilters {
            format: None,
            page: 3,
            ..Default::default()
        };
        let url = client().search_url(&CatalogQuery::new("AC/DC"), &filters);
        assert!(url.contains("q=AC%2FDC"));
        assert!(url.contains("page=3"));
        assert!(!url.contains("format="));
    }

    #[test]
    fn test_identifier_urls() {
        let client = client();
        assert_eq!(
            client.identifier_url("barcode", " 077774644129 "),
            "https://api.discogs.com/database/search?barcode=077774644129&type=release"
        );
        assert_eq!(
            client.identifier_url("catno", "PCS 7088"),
            "https://api.discogs.com/database/search?catno=PCS%207088&type=release"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_catalog_error() {
        let client =
            DiscogsClient::with_base_url(reqwest::Client::new(), None, "http://127.0.0.1:9");
        let err = client.release(1).await.unwrap_err();
        assert!(matches!(err.cause, RemoteFailure::Network(_)));
    }
}
