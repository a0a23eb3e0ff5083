use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::api::types::ItemVisits;
use crate::api::MarketplaceApi;
use crate::config::MAX_VISITS_ITEMS;
use crate::error::{Result, ScoutError};
use crate::models::{ListingTable, SortColumn, VisitWindow, VisitsRow, VisitsTable};
use crate::search::enricher::parse_timestamp;

/// Fetch visit counts for the top listings of `table`.
///
/// `num_items` above the provider's multiget limit is clamped. Fails with
/// `EmptyColumnSet` before any request when nothing is selected.
pub async fn fetch_visits<A>(
    api: &A,
    table: &ListingTable,
    num_items: usize,
    sort_by: SortColumn,
    window: VisitWindow,
) -> Result<VisitsTable>
where
    A: MarketplaceApi + ?Sized,
{
    let item_ids = top_item_ids(table, clamp_items(num_items), sort_by);
    if item_ids.is_empty() {
        return Err(ScoutError::EmptyColumnSet);
    }

    debug!(
        "Requesting {} visits for last {} {}(s)",
        item_ids.len(),
        window.last,
        window.unit
    );
    let series = api.visits(&item_ids, window).await?;
    assemble(item_ids, series)
}

fn clamp_items(num_items: usize) -> usize {
    if num_items > MAX_VISITS_ITEMS {
        warn!(
            "Maximum number of items is {}, resuming with num_items = {}",
            MAX_VISITS_ITEMS, MAX_VISITS_ITEMS
        );
        MAX_VISITS_ITEMS
    } else {
        num_items
    }
}

/// Ids of the first `n` rows ranked by `sort_by` descending. Ties keep table order.
pub fn top_item_ids(table: &ListingTable, n: usize, sort_by: SortColumn) -> Vec<String> {
    let mut ranked: Vec<_> = table.iter().collect();
    ranked.sort_by(|a, b| sort_by.compare_desc(a, b));
    ranked.into_iter().take(n).map(|r| r.id.clone()).collect()
}

/// Align per-item series on their dates.
///
/// The first requested item's dates form the index. Other items are joined onto it,
/// getting `None` where they have no point; their dates outside the index are dropped.
pub fn assemble(item_ids: Vec<String>, series: Vec<ItemVisits>) -> Result<VisitsTable> {
    let mut columns: Vec<BTreeMap<DateTime<Utc>, u64>> = vec![BTreeMap::new(); item_ids.len()];

    for item in series {
        let Some(col) = item_ids.iter().position(|id| *id == item.item_id) else {
            debug!("Ignoring visits for unrequested item {}", item.item_id);
            continue;
        };
        for point in item.results {
            let date =
                parse_timestamp(&point.date).ok_or_else(|| ScoutError::MalformedTimestamp {
                    id: item.item_id.clone(),
                    value: point.date.clone(),
                })?;
            columns[col].insert(date, point.total);
        }
    }

    let rows = match columns.split_first() {
        Some((index, others)) => index
            .iter()
            .map(|(date, first)| {
                let mut visits = Vec::with_capacity(item_ids.len());
                visits.push(Some(*first));
                visits.extend(others.iter().map(|col| col.get(date).copied()));
                VisitsRow { date: *date, visits }
            })
            .collect(),
        None => Vec::new(),
    };
    Ok(VisitsTable { item_ids, rows })
}
