use crate::api::types::{ItemVisits, SearchPage};
use crate::error::Result;
use crate::models::{CategoryInfo, CategorySummary, PageRequest, VisitWindow};
use async_trait::async_trait;

/// The provider's read-only endpoints.
/// Everything above this trait is provider agnostic and can run against a fake.
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// One window of search results plus the provider's paging metadata
    async fn search_page(&self, page: &PageRequest<'_>) -> Result<SearchPage>;

    /// Metadata for a category id, `CategoryNotFound` if the provider has no such id
    async fn category(&self, category_id: &str) -> Result<CategoryInfo>;

    /// Top-level categories of a site
    async fn site_categories(&self, site_id: &str) -> Result<Vec<CategorySummary>>;

    /// Visit time series for several items in one multiget
    async fn visits(&self, item_ids: &[String], window: VisitWindow) -> Result<Vec<ItemVisits>>;

    /// Get the name of the provider
    fn source_name(&self) -> &'static str;
}
