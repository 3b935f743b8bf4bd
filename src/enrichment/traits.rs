//! Trait definitions for external API clients.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses the real client implementations, while tests
//! can substitute mock implementations.

use async_trait::async_trait;

use super::discogs::DiscogsClient;
use super::domain::{
    ArtistInfo, CatalogEntry, CatalogError, CatalogQuery, RecommendationError, ReleaseDetail,
    SearchFilters, SimilarArtist, TopTrack,
};
use super::lastfm::LastFmClient;

/// Music catalog reads.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn search(
        &self,
        query: &CatalogQuery,
        filters: &SearchFilters,
    ) -> Result<Vec<CatalogEntry>, CatalogError>;

    async fn search_barcode(&self, barcode: &str) -> Result<Vec<CatalogEntry>, CatalogError>;

    async fn search_catno(&self, catno: &str) -> Result<Vec<CatalogEntry>, CatalogError>;

    async fn release(&self, release_id: u64) -> Result<ReleaseDetail, CatalogError>;

    async fn master(&self, master_id: u64) -> Result<ReleaseDetail, CatalogError>;
}

/// Recommendation reads for an artist name.
#[async_trait]
pub trait RecommendationApi: Send + Sync {
    async fn similar_artists(&self, artist: &str)
    -> Result<Vec<SimilarArtist>, RecommendationError>;

    async fn artist_info(&self, artist: &str) -> Result<Option<ArtistInfo>, RecommendationError>;

    async fn top_tracks(&self, artist: &str) -> Result<Vec<TopTrack>, RecommendationError>;
}

// Implement traits for real clients

#[async_trait]
impl CatalogApi for DiscogsClient {
    async fn search(
        &self,
        query: &CatalogQuery,
        filters: &SearchFilters,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.search(query, filters).await
    }

    async fn search_barcode(&self, barcode: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.search_barcode(barcode).await
    }

    async fn search_catno(&self, catno: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.search_catno(catno).await
    }

    async fn release(&self, release_id: u64) -> Result<ReleaseDetail, CatalogError> {
        self.release(release_id).await
    }

    async fn master(&self, master_id: u64) -> Result<ReleaseDetail, CatalogError> {
        self.master(master_id).await
    }
}

#[async_trait]
impl RecommendationApi for LastFmClient {
    async fn similar_artists(
        &self,
        artist: &str,
    ) -> Result<Vec<SimilarArtist>, RecommendationError> {
        self.similar_artists(artist).await
    }

    async fn artist_info(&self, artist: &str) -> Result<Option<ArtistInfo>, RecommendationError> {
        self.artist_info(artist).await
    }

    async fn top_tracks(&self, artist: &str) -> Result<Vec<TopTrack>, RecommendationError> {
        self.top_tracks(artist).await
    }
}
