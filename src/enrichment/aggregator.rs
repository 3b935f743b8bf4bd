//! Enrichment aggregator - similar artists, biography and top tracks for one artist.
//!
//! The three reads are independent, so they run concurrently and the
//! aggregator waits for all of them. A failing or slow read only empties its
//! own field; it is recorded in [`EnrichmentBundle::field_errors`] and never
//! returned as an error.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::domain::{EnrichmentBundle, EnrichmentField, RecommendationError, RemoteFailure};
use super::traits::RecommendationApi;

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds an [`EnrichmentBundle`] from a recommendation service.
#[derive(Clone)]
pub struct EnrichmentAggregator {
    api: Arc<dyn RecommendationApi>,
    call_timeout: Duration,
}

impl EnrichmentAggregator {
    pub fn new(api: Arc<dyn RecommendationApi>) -> Self {
        Self {
            api,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Bound each sub-call by `timeout` instead of the default 30s.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Fetch all three fields concurrently. Never fails.
    pub async fn enrich(&self, artist: &str) -> EnrichmentBundle {
        tracing::info!("Enriching artist '{}'", artist);

        let (similar, info, tracks) = tokio::join!(
            self.bounded(self.api.similar_artists(artist)),
            self.bounded(self.api.artist_info(artist)),
            self.bounded(self.api.top_tracks(artist)),
        );

        let mut bundle = EnrichmentBundle::empty(artist);
        match similar {
            Ok(similar) => bundle.similar_artists = similar,
            Err(e) => bundle.record_failure(EnrichmentField::SimilarArtists, e),
        }
        match info {
            Ok(info) => bundle.artist_info = info,
            Err(e) => bundle.record_failure(EnrichmentField::ArtistInfo, e),
        }
        match tracks {
            Ok(tracks) => bundle.top_tracks = tracks,
            Err(e) => bundle.record_failure(EnrichmentField::TopTracks, e),
        }

        tracing::debug!(
            "Enrichment for '{}': {} similar, info: {}, {} tracks, {} errors",
            artist,
            bundle.similar_artists.len(),
            bundle.artist_info.is_some(),
            bundle.top_tracks.len(),
            bundle.field_errors.len()
        );
        bundle
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, RecommendationError>>,
    ) -> Result<T, RecommendationError> {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(RemoteFailure::Timeout(self.call_timeout).into()),
        }
    }
}
