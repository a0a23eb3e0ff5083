mod category;
mod visits;

pub use category::{CategoryInfo, CategorySummary};
pub use visits::{SortColumn, TimeUnit, VisitWindow, VisitsRow, VisitsTable};

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoutError};

/// Display placeholder for a criterion that was not supplied
pub const NOT_AVAILABLE: &str = "N/A";

/// Search filters. At least one of the three is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCriteria")]
pub struct SearchCriteria {
    query: Option<String>,
    category: Option<String>,
    seller_id: Option<String>,
}

impl SearchCriteria {
    /// Blank strings count as absent. Fails with `InvalidCriteria` when nothing is left.
    pub fn new(
        query: Option<&str>,
        category: Option<&str>,
        seller_id: Option<&str>,
    ) -> Result<Self> {
        let clean = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let criteria = Self {
            query: clean(query),
            category: clean(category),
            seller_id: clean(seller_id),
        };

        if criteria.query.is_none() && criteria.category.is_none() && criteria.seller_id.is_none()
        {
            return Err(ScoutError::InvalidCriteria);
        }
        Ok(criteria)
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn seller_id(&self) -> Option<&str> {
        self.seller_id.as_deref()
    }
}

/// Unchecked wire form of `SearchCriteria`
#[derive(Debug, Default, Deserialize)]
struct RawCriteria {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    seller_id: Option<String>,
}

impl TryFrom<RawCriteria> for SearchCriteria {
    type Error = ScoutError;

    fn try_from(raw: RawCriteria) -> Result<Self> {
        Self::new(
            raw.query.as_deref(),
            raw.category.as_deref(),
            raw.seller_id.as_deref(),
        )
    }
}

/// One page of a search: the criteria plus an offset/limit window.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    pub criteria: &'a SearchCriteria,
    pub offset: usize,
    pub limit: usize,
}

impl<'a> PageRequest<'a> {
    pub fn new(criteria: &'a SearchCriteria, offset: usize, limit: usize) -> Self {
        Self {
            criteria,
            offset,
            limit,
        }
    }

    /// Query string pairs for the search endpoint. Absent filters are left out.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(5);
        if let Some(q) = self.criteria.query() {
            params.push(("q", q.to_string()));
        }
        if let Some(category) = self.criteria.category() {
            params.push(("category", category.to_string()));
        }
        if let Some(seller_id) = self.criteria.seller_id() {
            params.push(("seller_id", seller_id.to_string()));
        }
        params.push(("offset", self.offset.to_string()));
        params.push(("limit", self.limit.to_string()));
        params
    }
}

/// Seller location as nested in the search response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SellerAddress {
    pub city_name: Option<String>,
    pub state_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SellerRef {
    pub id: Option<String>,
}

/// A listing projected to the fixed column set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub id: String,
    pub title: String,
    pub price: f64,
    pub sold_quantity: u64,
    pub available_quantity: u64,
    pub permalink: String,
    pub thumbnail: String,
    pub seller_address: SellerAddress,
    pub seller: SellerRef,
    /// Raw expiration timestamp, parsed during enrichment
    pub stop_time: String,
    pub category_id: Option<String>,
}

/// A listing with the derived columns filled in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRow {
    pub id: String,
    pub title: String,
    pub price: f64,
    pub sold_quantity: u64,
    pub available_quantity: u64,
    pub permalink: String,
    pub thumbnail: String,
    pub seller_address: SellerAddress,
    pub seller: SellerRef,
    pub stop_time: DateTime<Utc>,
    pub category_id: Option<String>,
    pub revenue: f64,
    pub start_time: DateTime<Utc>,
    pub days_ago: i64,
    pub city: String,
    pub state: String,
    pub seller_id: String,
}

/// Final result of a search, keyed and ordered by listing id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListingTable {
    rows: Vec<EnrichedRow>,
}

impl ListingTable {
    /// Sorts by id and checks the keys are unique.
    pub fn from_rows(mut rows: Vec<EnrichedRow>) -> Result<Self> {
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        if let Some(pair) = rows.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(ScoutError::DuplicateKey(pair[0].id.clone()));
        }
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&EnrichedRow> {
        self.rows
            .binary_search_by(|row| row.id.as_str().cmp(id))
            .ok()
            .map(|idx| &self.rows[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnrichedRow> {
        self.rows.iter()
    }

    pub fn rows(&self) -> &[EnrichedRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<EnrichedRow> {
        self.rows
    }

    pub fn total_sold_quantity(&self) -> u64 {
        self.rows.iter().map(|r| r.sold_quantity).sum()
    }

    pub fn total_revenue(&self) -> f64 {
        self.rows.iter().map(|r| r.revenue).sum()
    }
}

/// What to do when a single listing is missing data or carries a bad timestamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowErrorPolicy {
    /// Fail the whole search on the first bad row
    #[default]
    Abort,
    /// Drop the row, log it and report it in `SearchReport::skipped`
    Skip,
}

impl FromStr for RowErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(format!("unknown row error policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    pub id: String,
    pub reason: String,
}

/// Human readable names for the criteria, for headers and log lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayNames {
    pub query: String,
    pub category: String,
    pub seller: String,
}

/// Everything a search produced
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub table: ListingTable,
    pub names: DisplayNames,
    /// Total the provider reported on the probe request
    pub total_available: usize,
    /// Rows the paginator aimed for
    pub target: usize,
    /// Rows fetched before deduplication
    pub fetched: usize,
    pub pages: usize,
    pub probe_url: Option<String>,
    pub skipped: Vec<SkippedRow>,
}

impl SearchReport {
    pub fn empty(names: DisplayNames, probe_url: Option<String>) -> Self {
        Self {
            table: ListingTable::default(),
            names,
            total_available: 0,
            target: 0,
            fetched: 0,
            pages: 0,
            probe_url,
            skipped: Vec::new(),
        }
    }
}
