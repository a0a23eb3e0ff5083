use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EnrichedRow;

/// Granularity of the visits time window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Day,
    Hour,
}

impl TimeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Day => "day",
            TimeUnit::Hour => "hour",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(TimeUnit::Day),
            "hour" => Ok(TimeUnit::Hour),
            other => Err(format!("unknown time unit: {other}")),
        }
    }
}

/// Look back `last` units from now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitWindow {
    pub unit: TimeUnit,
    pub last: u32,
}

impl VisitWindow {
    pub fn days(last: u32) -> Self {
        Self {
            unit: TimeUnit::Day,
            last,
        }
    }

    pub fn hours(last: u32) -> Self {
        Self {
            unit: TimeUnit::Hour,
            last,
        }
    }
}

impl Default for VisitWindow {
    fn default() -> Self {
        Self::days(365)
    }
}

/// Numeric column used to rank listings before picking the top N for visits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Revenue,
    SoldQuantity,
    Price,
    AvailableQuantity,
    DaysAgo,
}

impl SortColumn {
    /// Descending comparison on this column.
    pub fn compare_desc(&self, a: &EnrichedRow, b: &EnrichedRow) -> Ordering {
        match self {
            SortColumn::Revenue => b.revenue.total_cmp(&a.revenue),
            SortColumn::SoldQuantity => b.sold_quantity.cmp(&a.sold_quantity),
            SortColumn::Price => b.price.total_cmp(&a.price),
            SortColumn::AvailableQuantity => b.available_quantity.cmp(&a.available_quantity),
            SortColumn::DaysAgo => b.days_ago.cmp(&a.days_ago),
        }
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "revenue" => Ok(SortColumn::Revenue),
            "sold_quantity" => Ok(SortColumn::SoldQuantity),
            "price" => Ok(SortColumn::Price),
            "available_quantity" => Ok(SortColumn::AvailableQuantity),
            "days_ago" => Ok(SortColumn::DaysAgo),
            other => Err(format!("unknown sort column: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitsRow {
    pub date: DateTime<Utc>,
    /// One cell per item, aligned with `VisitsTable::item_ids`
    pub visits: Vec<Option<u64>>,
}

/// Visits indexed by date, one column per item id
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VisitsTable {
    pub item_ids: Vec<String>,
    pub rows: Vec<VisitsRow>,
}

impl VisitsTable {
    pub fn get(&self, date: DateTime<Utc>, item_id: &str) -> Option<u64> {
        let col = self.item_ids.iter().position(|id| id == item_id)?;
        let row = self.rows.iter().find(|r| r.date == date)?;
        row.visits[col]
    }

    /// The full column for one item, gaps included.
    pub fn column(&self, item_id: &str) -> Option<Vec<Option<u64>>> {
        let col = self.item_ids.iter().position(|id| id == item_id)?;
        Some(self.rows.iter().map(|r| r.visits[col]).collect())
    }

    pub fn total_for(&self, item_id: &str) -> Option<u64> {
        self.column(item_id)
            .map(|cells| cells.into_iter().flatten().sum())
    }
}
