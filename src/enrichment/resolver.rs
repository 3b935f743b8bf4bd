//! Catalog resolver - turns a recognized album/artist into catalog entries.
//!
//! Thin layer over a [`CatalogApi`]: it owns the default search filters and
//! logs outcomes. Every call is an idempotent read with no retries and no
//! caching, so asking for the same release twice makes two requests.

use std::sync::Arc;

use super::domain::{CatalogEntry, CatalogError, CatalogQuery, ReleaseDetail, SearchFilters};
use super::traits::CatalogApi;

/// Searches the catalog and fetches release details on request.
#[derive(Clone)]
pub struct CatalogResolver {
    api: Arc<dyn CatalogApi>,
    filters: SearchFilters,
}

impl CatalogResolver {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self::with_filters(api, SearchFilters::default())
    }

    /// Use `filters` whenever a caller doesn't pass its own.
    pub fn with_filters(api: Arc<dyn CatalogApi>, filters: SearchFilters) -> Self {
        Self { api, filters }
    }

    pub fn default_filters(&self) -> &SearchFilters {
        &self.filters
    }

    /// Search with explicit filters. Results keep the catalog's order.
    pub async fn search(
        &self,
        query: &CatalogQuery,
        filters: &SearchFilters,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        tracing::debug!("Catalog search: {:?}", query.text);
        let result = self.api.search(query, filters).await;
        match &result {
            Ok(entries) => tracing::info!(
                "Catalog search for {:?} returned {} entries",
                query.text,
                entries.len()
            ),
            Err(e) => tracing::warn!("Catalog search for {:?} failed: {}", query.text, e),
        }
        result
    }

    /// Search with the resolver's default filters.
    pub async fn search_default(
        &self,
        query: &CatalogQuery,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.search(query, &self.filters).await
    }

    pub async fn search_barcode(&self, barcode: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.api.search_barcode(barcode).await
    }

    /// Search by a label catalog number printed on the sleeve or spine.
    pub async fn search_catno(&self, catno: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        tracing::debug!("Catalog number search: {:?}", catno);
        self.api.search_catno(catno).await
    }

    /// Fetch the full record for a release id.
    pub async fn detail(&self, release_id: u64) -> Result<ReleaseDetail, CatalogError> {
        tracing::debug!("Fetching release {}", release_id);
        self.api.release(release_id).await
    }

    /// Fetch the master release grouping all pressings.
    pub async fn master(&self, master_id: u64) -> Result<ReleaseDetail, CatalogError> {
        tracing::debug!("Fetching master {}", master_id);
        self.api.master(master_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::domain::RemoteFailure;
    use crate::enrichment::traits::mocks::MockCatalog;

    fn resolver(mock: MockCatalog) -> (CatalogResolver, Arc<MockCatalog>) {
        let mock = Arc::new(mock);
        (CatalogResolver::new(mock.clone()), mock)
    }

    #[tokio::test]
    async fn test_search_preserves_order() {
        let (resolver, _) = resolver(MockCatalog::with_entries(&[
            (3, "Third"),
            (1, "First"),
            (2, "Second"),
        ]));
        let entries = resolver
            .search_default(&CatalogQuery::new("anything"))
            .await
            .unwrap();
        let ids: Vec<u64> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_detail_twice_is_identical_and_not_cached() {
        let (resolver, mock) = resolver(MockCatalog::with_entries(&[(249504, "Abbey Road")]));
        let first = resolver.detail(249504).await.unwrap();
        let second = resolver.detail(249504).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failure_carries_cause() {
        let (resolver, _) = resolver(MockCatalog::with_error(RemoteFailure::Status {
            status: 500,
            message: "boom".to_string(),
        }));
        let err = resolver
            .search_default(&CatalogQuery::new("x"))
            .await
            .unwrap_err();
        assert_eq!(
            err.cause,
            RemoteFailure::Status {
                status: 500,
                message: "boom".to_string()
            }
        );
        assert!(err.to_string().contains("HTTP 500"));
    }

    #[test]
    fn test_default_filters() {
        let (resolver, _) = resolver(MockCatalog::default());
        assert_eq!(resolver.default_filters(), &SearchFilters::default());
    }

    #[tokio::test]
    async fn test_catno_search_goes_to_catalog() {
        let (resolver, mock) = resolver(MockCatalog::with_entries(&[(123, "Abbey Road")]));
        let entries = resolver.search_catno("PCS 7088").await.unwrap();
        assert_eq!(entries[0].id, 123);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_master_lookup() {
        let (resolver, _) = resolver(MockCatalog::with_entries(&[(24047, "Abbey Road")]));
        let master = resolver.master(24047).await.unwrap();
        assert_eq!(master.title, "Abbey Road");
    }
}
