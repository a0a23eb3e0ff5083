use crate::api::MarketplaceApi;
use crate::error::Result;
use crate::models::{CategoryInfo, CategorySummary};

/// Read-only category lookups. Each call is exactly one request.
pub struct CategoryLookup<'a, A: ?Sized> {
    api: &'a A,
}

impl<'a, A: MarketplaceApi + ?Sized> CategoryLookup<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Top-level categories of a site, e.g. `MLB`
    pub async fn top_level(&self, site_id: &str) -> Result<Vec<CategorySummary>> {
        self.api.site_categories(site_id).await
    }

    pub async fn info(&self, category_id: &str) -> Result<CategoryInfo> {
        self.api.category(category_id).await
    }

    pub async fn name(&self, category_id: &str) -> Result<String> {
        Ok(self.api.category(category_id).await?.name)
    }

    /// Categories one level below the one given
    pub async fn children(&self, category_id: &str) -> Result<Vec<CategorySummary>> {
        Ok(self.api.category(category_id).await?.children_categories)
    }
}
