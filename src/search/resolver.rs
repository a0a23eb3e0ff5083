use tracing::warn;

use crate::api::MarketplaceApi;
use crate::error::Result;
use crate::models::{DisplayNames, SearchCriteria, NOT_AVAILABLE};

/// Validate raw filters. Nothing goes over the network.
pub fn resolve_criteria(
    query: Option<&str>,
    category: Option<&str>,
    seller_id: Option<&str>,
) -> Result<SearchCriteria> {
    SearchCriteria::new(query, category, seller_id)
}

/// Best-effort display names. The category lookup may fail; that only costs the
/// pretty name, never the search.
pub async fn display_names<A>(api: &A, criteria: &SearchCriteria) -> DisplayNames
where
    A: MarketplaceApi + ?Sized,
{
    let category = match criteria.category() {
        Some(id) => match api.category(id).await {
            Ok(info) => info.name,
            Err(e) => {
                warn!("Could not resolve category name for {}: {}", id, e);
                id.to_string()
            }
        },
        None => NOT_AVAILABLE.to_string(),
    };

    DisplayNames {
        query: criteria.query().unwrap_or(NOT_AVAILABLE).to_string(),
        category,
        seller: criteria.seller_id().unwrap_or(NOT_AVAILABLE).to_string(),
    }
}
