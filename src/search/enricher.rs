use std::collections::HashSet;

use chrono::{DateTime, Months, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::warn;

use crate::error::{Result, ScoutError};
use crate::models::{
    EnrichedRow, ListingTable, ResultRow, RowErrorPolicy, SellerAddress, SellerRef, SkippedRow,
};

/// The provider stamps listings with an expiration 20 years after publication.
const LISTING_LIFETIME_YEARS: u32 = 20;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Default)]
pub struct Enriched {
    pub table: ListingTable,
    pub skipped: Vec<SkippedRow>,
}

/// Turn raw search results into the final keyed table.
///
/// `now` drives `days_ago`. Row-level failures (`MissingField`, `MalformedTimestamp`)
/// abort or are skipped according to `policy`; a row skipped after deduplication does
/// not bring back the same-titled rows it displaced.
pub fn enrich(raw: &[Value], now: DateTime<Utc>, policy: RowErrorPolicy) -> Result<Enriched> {
    let mut skipped = Vec::new();

    let mut projected = Vec::with_capacity(raw.len());
    for (idx, value) in raw.iter().enumerate() {
        match project_row(value, idx) {
            Ok(row) => projected.push(row),
            Err(e) => absorb(e, policy, &mut skipped)?,
        }
    }

    let deduped = dedup_rows(projected);

    let mut enriched = Vec::with_capacity(deduped.len());
    for row in deduped {
        match enrich_row(row, now) {
            Ok(row) => enriched.push(row),
            Err(e) => absorb(e, policy, &mut skipped)?,
        }
    }

    let table = ListingTable::from_rows(enriched)?;
    Ok(Enriched { table, skipped })
}

fn absorb(err: ScoutError, policy: RowErrorPolicy, skipped: &mut Vec<SkippedRow>) -> Result<()> {
    if policy == RowErrorPolicy::Abort || !err.is_row_error() {
        return Err(err);
    }
    let id = match &err {
        ScoutError::MissingField { id, .. } | ScoutError::MalformedTimestamp { id, .. } => {
            id.clone()
        }
        _ => String::new(),
    };
    warn!("Skipping listing {}: {}", id, err);
    skipped.push(SkippedRow {
        id,
        reason: err.to_string(),
    });
    Ok(())
}

/// Project one raw listing onto the fixed column set.
/// `idx` labels rows that lack an id.
pub fn project_row(value: &Value, idx: usize) -> Result<ResultRow> {
    let id = match value.get("id").and_then(Value::as_str) {
        Some(id) => id.to_string(),
        None => {
            return Err(ScoutError::MissingField {
                id: format!("#{idx}"),
                field: "id",
            })
        }
    };

    let missing = |field: &'static str| ScoutError::MissingField {
        id: id.clone(),
        field,
    };
    let text = |field: &'static str| {
        value
            .get(field)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| missing(field))
    };
    let count = |field: &'static str| {
        value
            .get(field)
            .and_then(|v| {
                v.as_u64()
                    .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            })
            .ok_or_else(|| missing(field))
    };

    let price = value
        .get("price")
        .and_then(Value::as_f64)
        .ok_or_else(|| missing("price"))?;

    let address = value
        .get("seller_address")
        .filter(|v| v.is_object())
        .ok_or_else(|| missing("seller_address"))?;
    let seller = value
        .get("seller")
        .filter(|v| v.is_object())
        .ok_or_else(|| missing("seller"))?;

    Ok(ResultRow {
        title: text("title")?,
        price,
        sold_quantity: count("sold_quantity")?,
        available_quantity: count("available_quantity")?,
        permalink: text("permalink")?,
        thumbnail: text("thumbnail")?,
        seller_address: SellerAddress {
            city_name: nested_name(address, "city"),
            state_name: nested_name(address, "state"),
        },
        seller: SellerRef {
            id: seller.get("id").and_then(id_to_string),
        },
        stop_time: text("stop_time")?,
        category_id: value
            .get("category_id")
            .and_then(Value::as_str)
            .map(str::to_string),
        id,
    })
}

fn nested_name(address: &Value, key: &str) -> Option<String> {
    address
        .get(key)
        .and_then(|v| v.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn id_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Stable sort by sold quantity descending, then keep the first row per title and
/// per id. An id seen again under an edited title is dropped like a title duplicate.
/// Idempotent: the output is already sorted, title-unique and id-unique.
pub fn dedup_rows(mut rows: Vec<ResultRow>) -> Vec<ResultRow> {
    rows.sort_by(|a, b| b.sold_quantity.cmp(&a.sold_quantity));
    let mut titles = HashSet::with_capacity(rows.len());
    let mut ids = HashSet::with_capacity(rows.len());
    rows.retain(|row| {
        if ids.contains(&row.id) || !titles.insert(row.title.clone()) {
            return false;
        }
        ids.insert(row.id.clone());
        true
    });
    rows
}

fn enrich_row(row: ResultRow, now: DateTime<Utc>) -> Result<EnrichedRow> {
    let revenue = row.sold_quantity as f64 * row.price;

    let stop_time = parse_timestamp(&row.stop_time).ok_or_else(|| {
        ScoutError::MalformedTimestamp {
            id: row.id.clone(),
            value: row.stop_time.clone(),
        }
    })?;
    let start_time = start_time_from(stop_time).ok_or_else(|| ScoutError::MalformedTimestamp {
        id: row.id.clone(),
        value: row.stop_time.clone(),
    })?;
    let days_ago = whole_days_between(start_time, now);

    let missing = |field: &'static str| ScoutError::MissingField {
        id: row.id.clone(),
        field,
    };
    let city = row
        .seller_address
        .city_name
        .clone()
        .ok_or_else(|| missing("seller_address.city.name"))?;
    let state = row
        .seller_address
        .state_name
        .clone()
        .ok_or_else(|| missing("seller_address.state.name"))?;
    let seller_id = row.seller.id.clone().ok_or_else(|| missing("seller.id"))?;

    Ok(EnrichedRow {
        id: row.id,
        title: row.title,
        price: row.price,
        sold_quantity: row.sold_quantity,
        available_quantity: row.available_quantity,
        permalink: row.permalink,
        thumbnail: row.thumbnail,
        seller_address: row.seller_address,
        seller: row.seller,
        stop_time,
        category_id: row.category_id,
        revenue,
        start_time,
        days_ago,
        city,
        state,
        seller_id,
    })
}

/// Parse an RFC 3339 timestamp, or a naive ISO 8601 one taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Calendar subtraction of the listing lifetime. Feb 29 lands on Feb 28.
pub fn start_time_from(stop_time: DateTime<Utc>) -> Option<DateTime<Utc>> {
    stop_time.checked_sub_months(Months::new(12 * LISTING_LIFETIME_YEARS))
}

/// Floored whole days from `start` to `now`; negative when `start` is in the future.
pub fn whole_days_between(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - start).num_seconds().div_euclid(SECONDS_PER_DAY)
}
