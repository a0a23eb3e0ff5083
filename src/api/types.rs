use serde::{Deserialize, Serialize};

/// Paging block of a search response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paging {
    pub total: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
}

/// Search response. Listings stay untyped until the enricher projects them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchPage {
    pub paging: Paging,
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
    /// Final request URL, filled in by the client
    #[serde(skip)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitPoint {
    pub date: String,
    #[serde(default)]
    pub total: u64,
}

/// Visits for a single item over the requested window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemVisits {
    pub item_id: String,
    #[serde(default)]
    pub total_visits: u64,
    #[serde(default)]
    pub results: Vec<VisitPoint>,
}
