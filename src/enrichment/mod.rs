//! Catalog lookup and artist enrichment from external services.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - Internal types that represent our business logic
//! - **API DTOs** (`discogs/dto.rs`, `lastfm/dto.rs`) - Exact API response shapes
//! - **Adapters** - Convert DTOs to domain models
//! - **Clients** - HTTP clients for external APIs, sharing `http.rs`
//! - **Traits** - Seams for injecting mock clients in tests
//! - **Resolver / Aggregator** - High-level catalog search and the concurrent
//!   recommendation fan-out
//!
//! # Usage
//!
//! ```ignore
//! let http = enrichment::http::build_client(&HttpSettings::default())?;
//! let resolver = CatalogResolver::new(Arc::new(DiscogsClient::new(http.clone(), token)));
//! let aggregator = EnrichmentAggregator::new(Arc::new(LastFmClient::new(http, api_key)));
//!
//! let entries = resolver.search_default(&CatalogQuery::new("Abbey Road The Beatles")).await?;
//! let bundle = aggregator.enrich("The Beatles").await;
//! ```

pub mod aggregator;
pub mod discogs;
pub mod domain;
pub mod http;
pub mod lastfm;
pub mod links;
pub mod resolver;
pub mod traits;

pub use aggregator::EnrichmentAggregator;
pub use discogs::DiscogsClient;
pub use domain::{
    CatalogEntry, CatalogError, CatalogQuery, EnrichmentBundle, EnrichmentField,
    RecommendationError, ReleaseDetail, RemoteFailure, SearchFilters,
};
pub use http::HttpSettings;
pub use lastfm::LastFmClient;
pub use resolver::CatalogResolver;
pub use traits::{CatalogApi, RecommendationApi};
