use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::MarketplaceApi;
use crate::config::{DEFAULT_ITEMS_PER_REQUEST, MAX_PAGE_SIZE};
use crate::error::{Result, ScoutError};
use crate::models::{PageRequest, SearchCriteria};
use crate::progress::ProgressObserver;

/// Paging controls for one search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Rows per request, at most `MAX_PAGE_SIZE`
    pub items_per_request: usize,
    /// Max rows to fetch, 0 fetches everything available
    pub total_results_limit: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            items_per_request: DEFAULT_ITEMS_PER_REQUEST,
            total_results_limit: 0,
        }
    }
}

impl Pagination {
    pub fn new(items_per_request: usize, total_results_limit: usize) -> Self {
        Self {
            items_per_request,
            total_results_limit,
        }
    }

    /// Page size actually sent to the provider.
    pub fn page_size(&self) -> Result<usize> {
        match self.items_per_request {
            0 => Err(ScoutError::InvalidPageSize(0)),
            n if n > MAX_PAGE_SIZE => {
                warn!(
                    "items_per_request {} exceeds the provider maximum, using {}",
                    n, MAX_PAGE_SIZE
                );
                Ok(MAX_PAGE_SIZE)
            }
            n => Ok(n),
        }
    }

    /// Rows to fetch given what the provider has.
    pub fn target(&self, total_available: usize) -> usize {
        if self.total_results_limit == 0 || self.total_results_limit > total_available {
            total_available
        } else {
            self.total_results_limit
        }
    }
}

/// Raw listings accumulated across pages, before any enrichment
#[derive(Debug, Clone, Default)]
pub struct FetchedPages {
    pub rows: Vec<Value>,
    pub total_available: usize,
    pub target: usize,
    /// Page requests issued after the probe
    pub pages: usize,
    pub probe_url: Option<String>,
}

/// Probe for the total, then walk offsets until the target is reached.
///
/// The target is fixed from the probe. If the provider's total moves later on, the
/// run keeps its target and only stops early through `ShortPagination` when a page
/// comes back empty.
pub async fn fetch_all<A>(
    api: &A,
    criteria: &SearchCriteria,
    pagination: Pagination,
    progress: &dyn ProgressObserver,
) -> Result<FetchedPages>
where
    A: MarketplaceApi + ?Sized,
{
    let page_size = pagination.page_size()?;

    let probe = api.search_page(&PageRequest::new(criteria, 0, 1)).await?;
    let total_available = probe.paging.total;
    if let Some(url) = &probe.url {
        debug!("Initial request sent to API: {}", url);
    }

    if total_available == 0 {
        info!("No results found. Please try other search parameters.");
        return Err(ScoutError::NoResultsFound {
            probe_url: probe.url,
        });
    }
    info!("{} results found.", total_available);

    let target = pagination.target(total_available);
    let mut fetched = FetchedPages {
        rows: Vec::with_capacity(target),
        total_available,
        target,
        pages: 0,
        probe_url: probe.url,
    };

    progress.on_start(target);
    let mut offset = 0usize;
    let mut drift_reported = false;

    while fetched.rows.len() < target {
        let limit = page_size.min(target - fetched.rows.len());
        let page = api
            .search_page(&PageRequest::new(criteria, offset, limit))
            .await?;
        fetched.pages += 1;

        if page.paging.total != total_available && !drift_reported {
            warn!(
                "Provider total changed from {} to {} while paging, keeping target {}",
                total_available, page.paging.total, target
            );
            drift_reported = true;
        }

        let mut results = page.results;
        results.truncate(limit);
        if results.is_empty() {
            warn!(
                "Empty page at offset {} with {}/{} rows fetched",
                offset,
                fetched.rows.len(),
                target
            );
            return Err(ScoutError::ShortPagination {
                fetched: fetched.rows.len(),
                target,
                offset,
            });
        }

        offset += results.len();
        fetched.rows.extend(results);
        progress.on_page(fetched.rows.len(), target);
    }

    progress.on_finish(fetched.rows.len(), target);
    Ok(fetched)
}
