pub mod enricher;
pub mod paginator;
pub mod resolver;

pub use paginator::Pagination;
pub use resolver::{display_names, resolve_criteria};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::api::MarketplaceApi;
use crate::categories::CategoryLookup;
use crate::config::Config;
use crate::error::{Result, ScoutError};
use crate::models::{
    ListingTable, RowErrorPolicy, SearchCriteria, SearchReport, SortColumn, VisitWindow,
    VisitsTable,
};
use crate::progress::{LogProgress, ProgressObserver};
use crate::visits::fetch_visits;

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Runs searches against a marketplace: resolve names, page, enrich.
pub struct MarketScout<A> {
    api: A,
    pagination: Pagination,
    row_error_policy: RowErrorPolicy,
    clock: Clock,
    progress: Box<dyn ProgressObserver>,
}

impl<A: MarketplaceApi> MarketScout<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            pagination: Pagination::default(),
            row_error_policy: RowErrorPolicy::default(),
            clock: Box::new(Utc::now),
            progress: Box::new(LogProgress),
        }
    }

    pub fn from_config(api: A, config: &Config) -> Self {
        Self::new(api)
            .with_pagination(Pagination::new(
                config.items_per_request,
                config.total_results_limit,
            ))
            .with_row_error_policy(config.row_error_policy)
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn with_row_error_policy(mut self, policy: RowErrorPolicy) -> Self {
        self.row_error_policy = policy;
        self
    }

    /// Replace the wall clock used for `days_ago`
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_progress<P: ProgressObserver + 'static>(mut self, progress: P) -> Self {
        self.progress = Box::new(progress);
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn categories(&self) -> CategoryLookup<'_, A> {
        CategoryLookup::new(&self.api)
    }

    /// Search, paginate and enrich. Zero matches yield an empty report, not an error.
    pub async fn search(&self, criteria: &SearchCriteria) -> Result<SearchReport> {
        let names = display_names(&self.api, criteria).await;
        info!(
            "Searching for \"{}\" in {} sold by {} on {}...",
            names.query,
            names.category,
            names.seller,
            self.api.source_name()
        );

        let fetched = match paginator::fetch_all(
            &self.api,
            criteria,
            self.pagination,
            self.progress.as_ref(),
        )
        .await
        {
            Ok(fetched) => fetched,
            Err(ScoutError::NoResultsFound { probe_url }) => {
                return Ok(SearchReport::empty(names, probe_url))
            }
            Err(e) => return Err(e),
        };

        let enriched = enricher::enrich(&fetched.rows, (self.clock)(), self.row_error_policy)?;
        info!(
            "{} listings after removing duplicates ({} fetched, {} skipped)",
            enriched.table.len(),
            fetched.rows.len(),
            enriched.skipped.len()
        );

        Ok(SearchReport {
            table: enriched.table,
            names,
            total_available: fetched.total_available,
            target: fetched.target,
            fetched: fetched.rows.len(),
            pages: fetched.pages,
            probe_url: fetched.probe_url,
            skipped: enriched.skipped,
        })
    }

    /// Visits for the top `num_items` listings of `table` ranked by `sort_by`.
    pub async fn visits(
        &self,
        table: &ListingTable,
        num_items: usize,
        sort_by: SortColumn,
        window: VisitWindow,
    ) -> Result<VisitsTable> {
        fetch_visits(&self.api, table, num_items, sort_by, window).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{catalogue, category, listing, FakeMarketplace};
    use crate::progress::NoProgress;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2017, 1, 10, 12, 0, 0).unwrap()
    }

    fn scout(api: FakeMarketplace) -> MarketScout<FakeMarketplace> {
        MarketScout::new(api)
            .with_clock(fixed_now)
            .with_progress(NoProgress)
    }

    #[tokio::test]
    async fn mouse_search_end_to_end() {
        let scout = scout(FakeMarketplace::with_listings(catalogue(200)))
            .with_pagination(Pagination::new(50, 120));
        let criteria = SearchCriteria::new(Some("mouse"), None, None).unwrap();

        let report = scout.search(&criteria).await.unwrap();
        assert_eq!(report.fetched, 120);
        assert_eq!(report.pages, 3);
        assert_eq!(report.total_available, 200);
        assert_eq!(report.table.len(), 120);
        assert_eq!(report.names.query, "mouse");
        assert!(report.probe_url.is_some());

        let ids: Vec<_> = report.table.iter().map(|r| r.id.clone()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert!(report.table.iter().all(|r| r.days_ago == 61));
    }

    #[tokio::test]
    async fn no_results_is_an_empty_report() {
        let scout = scout(FakeMarketplace::with_listings(Vec::new()));
        let criteria = SearchCriteria::new(Some("x"), None, None).unwrap();

        let report = scout.search(&criteria).await.unwrap();
        assert!(report.table.is_empty());
        assert_eq!(report.total_available, 0);
        assert_eq!(scout.api().searches().len(), 1);
        assert_eq!(
            report.probe_url.as_deref(),
            Some("https://api.mercadolibre.com/sites/MLB/search?offset=0&limit=1")
        );
    }

    #[tokio::test]
    async fn display_lookup_failure_does_not_abort_search() {
        let mut api = FakeMarketplace::with_listings(vec![listing("MLB1", "Mouse", 1, 9.0)]);
        api.fail_categories = true;
        let criteria = SearchCriteria::new(None, Some("MLB1648"), None).unwrap();

        let report = scout(api).search(&criteria).await.unwrap();
        assert_eq!(report.table.len(), 1);
        assert_eq!(report.names.category, "MLB1648");
    }

    #[tokio::test]
    async fn duplicates_collapse_across_pages() {
        let api = FakeMarketplace::with_listings(vec![
            listing("MLB1", "Widget", 5, 2.0),
            listing("MLB2", "Widget", 10, 2.0),
            listing("MLB3", "Gadget", 1, 2.0),
        ]);
        let scout = scout(api).with_pagination(Pagination::new(1, 0));
        let criteria = SearchCriteria::new(Some("widget"), None, None).unwrap();

        let report = scout.search(&criteria).await.unwrap();
        assert_eq!(report.fetched, 3);
        assert_eq!(report.pages, 3);
        let ids: Vec<_> = report.table.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["MLB2", "MLB3"]);
        assert_eq!(report.table.get("MLB2").unwrap().revenue, 20.0);
    }

    #[tokio::test]
    async fn from_config_applies_policy_and_paging() {
        let mut bad = listing("MLB2", "Broken", 1, 1.0);
        bad["stop_time"] = serde_json::json!("garbage");
        let api = FakeMarketplace::with_listings(vec![listing("MLB1", "Fine", 1, 1.0), bad]);
        let config = Config {
            items_per_request: 1,
            row_error_policy: RowErrorPolicy::Skip,
            ..Config::default()
        };
        let scout = MarketScout::from_config(api, &config)
            .with_clock(fixed_now)
            .with_progress(NoProgress);
        let criteria = SearchCriteria::new(Some("thing"), None, None).unwrap();

        let report = scout.search(&criteria).await.unwrap();
        assert_eq!(report.table.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].id, "MLB2");
        assert_eq!(scout.api().searches().len(), 3);
    }

    #[tokio::test]
    async fn categories_are_reachable_from_the_scout() {
        let mut api = FakeMarketplace::default();
        api.categories
            .insert("MLB5672".to_string(), category("MLB5672", "Acessórios", &[]));
        let name = scout(api).categories().name("MLB5672").await.unwrap();
        assert_eq!(name, "Acessórios");
    }
}
