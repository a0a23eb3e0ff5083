use std::str::FromStr;

use crate::error::{Result, ScoutError};
use crate::models::{RowErrorPolicy, SortColumn, TimeUnit};

pub const MELI_API_URL: &str = "https://api.mercadolibre.com";
pub const DEFAULT_SITE_ID: &str = "MLB";

/// Largest `limit` the search endpoint accepts per request.
pub const MAX_PAGE_SIZE: usize = 200;

/// Largest number of ids the visits multiget accepts.
pub const MAX_VISITS_ITEMS: usize = 50;

pub const DEFAULT_ITEMS_PER_REQUEST: usize = 50;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("meli-scout/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub site_id: String,
    pub log_level: String,
    pub user_agent: String,
    /// Per-request timeout (HTTP_TIMEOUT_SECS)
    pub timeout_secs: u64,
    /// Page size for the paginator (ITEMS_PER_REQUEST)
    pub items_per_request: usize,
    /// Max rows to download, 0 means everything available (TOTAL_RESULTS_LIMIT)
    pub total_results_limit: usize,
    /// What to do with listings the provider returned incomplete (ROW_ERROR_POLICY)
    pub row_error_policy: RowErrorPolicy,
    pub search_query: Option<String>,
    pub search_category: Option<String>,
    pub search_seller_id: Option<String>,
    /// How many top listings get a visits lookup, 0 disables it (VISITS_ITEMS)
    pub visits_items: usize,
    pub visits_sort_by: SortColumn,
    pub visits_unit: TimeUnit,
    pub visits_last: u32,
    pub output_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: MELI_API_URL.to_string(),
            site_id: DEFAULT_SITE_ID.to_string(),
            log_level: "info".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            items_per_request: DEFAULT_ITEMS_PER_REQUEST,
            total_results_limit: 0,
            row_error_policy: RowErrorPolicy::Abort,
            search_query: None,
            search_category: None,
            search_seller_id: None,
            visits_items: 0,
            visits_sort_by: SortColumn::Revenue,
            visits_unit: TimeUnit::Day,
            visits_last: 365,
            output_path: "listings.json".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup, so tests need not touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            api_url: non_empty("MELI_API_URL").unwrap_or(defaults.api_url),
            site_id: non_empty("MELI_SITE_ID").unwrap_or(defaults.site_id),
            log_level: non_empty("LOG_LEVEL").unwrap_or(defaults.log_level),
            user_agent: non_empty("USER_AGENT").unwrap_or(defaults.user_agent),
            timeout_secs: parse_var(&non_empty, "HTTP_TIMEOUT_SECS", defaults.timeout_secs)?,
            items_per_request: parse_var(
                &non_empty,
                "ITEMS_PER_REQUEST",
                defaults.items_per_request,
            )?,
            total_results_limit: parse_var(
                &non_empty,
                "TOTAL_RESULTS_LIMIT",
                defaults.total_results_limit,
            )?,
            row_error_policy: parse_var(
                &non_empty,
                "ROW_ERROR_POLICY",
                defaults.row_error_policy,
            )?,
            search_query: non_empty("SEARCH_QUERY"),
            search_category: non_empty("SEARCH_CATEGORY"),
            search_seller_id: non_empty("SEARCH_SELLER_ID"),
            visits_items: parse_var(&non_empty, "VISITS_ITEMS", defaults.visits_items)?,
            visits_sort_by: parse_var(&non_empty, "VISITS_SORT_BY", defaults.visits_sort_by)?,
            visits_unit: parse_var(&non_empty, "VISITS_UNIT", defaults.visits_unit)?,
            visits_last: parse_var(&non_empty, "VISITS_LAST", defaults.visits_last)?,
            output_path: non_empty("OUTPUT_PATH").unwrap_or(defaults.output_path),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse but cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(ScoutError::Config(
                "HTTP_TIMEOUT_SECS must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ScoutError::Config(format!("{key} has an invalid value: {raw:?}"))),
        None => Ok(default),
    }
}
