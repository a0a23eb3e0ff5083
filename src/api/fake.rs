//! Scripted in-memory provider for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::api::traits::MarketplaceApi;
use crate::api::types::{ItemVisits, Paging, SearchPage};
use crate::error::{Result, ScoutError};
use crate::models::{CategoryInfo, CategorySummary, PageRequest, VisitWindow};

/// A complete listing as the search endpoint returns it.
pub fn listing(id: &str, title: &str, sold_quantity: u64, price: f64) -> Value {
    json!({
        "id": id,
        "site_id": "MLB",
        "title": title,
        "price": price,
        "currency_id": "BRL",
        "sold_quantity": sold_quantity,
        "available_quantity": 5,
        "permalink": format!("https://produto.mercadolivre.com.br/{id}"),
        "thumbnail": format!("https://http2.mlstatic.com/{id}-I.jpg"),
        "seller_address": {
            "city": { "id": "TUxCQ1NBTzRmYTBm", "name": "São Paulo" },
            "state": { "id": "BR-SP", "name": "São Paulo" }
        },
        "seller": { "id": 123456, "power_seller_status": null },
        "stop_time": "2036-11-10T04:00:00.000Z",
        "category_id": "MLB1648"
    })
}

/// `count` distinct listings with ids MLB0000..MLBnnnn.
pub fn catalogue(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| listing(&format!("MLB{i:04}"), &format!("Item {i}"), (i % 7) as u64, 10.0))
        .collect()
}

pub fn category(id: &str, name: &str, children: &[(&str, &str)]) -> CategoryInfo {
    CategoryInfo {
        id: id.to_string(),
        name: name.to_string(),
        path_from_root: vec![CategorySummary {
            id: id.to_string(),
            name: name.to_string(),
        }],
        children_categories: children
            .iter()
            .map(|(id, name)| CategorySummary {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect(),
        total_items_in_this_category: Some(42),
        extra: serde_json::Map::new(),
    }
}

#[derive(Default)]
pub struct FakeMarketplace {
    pub listings: Vec<Value>,
    /// Total reported on the probe. Later pages report `later_total` when set.
    pub reported_total: usize,
    pub later_total: Option<usize>,
    /// Caps rows per response below the requested limit
    pub max_rows_per_page: Option<usize>,
    /// Pages served beyond the requested limit, to check the paginator trims them
    pub overfill: usize,
    pub categories: HashMap<String, CategoryInfo>,
    pub site_categories: Vec<CategorySummary>,
    pub fail_categories: bool,
    pub visits: Vec<ItemVisits>,
    pub search_requests: Mutex<Vec<(usize, usize)>>,
    pub category_requests: Mutex<Vec<String>>,
    pub visits_requests: Mutex<Vec<(Vec<String>, VisitWindow)>>,
}

impl FakeMarketplace {
    pub fn with_listings(listings: Vec<Value>) -> Self {
        Self {
            reported_total: listings.len(),
            listings,
            ..Self::default()
        }
    }

    pub fn searches(&self) -> Vec<(usize, usize)> {
        self.search_requests.lock().unwrap().clone()
    }

    pub fn category_calls(&self) -> usize {
        self.category_requests.lock().unwrap().len()
    }
}

#[async_trait]
impl MarketplaceApi for FakeMarketplace {
    async fn search_page(&self, page: &PageRequest<'_>) -> Result<SearchPage> {
        let first = {
            let mut requests = self.search_requests.lock().unwrap();
            requests.push((page.offset, page.limit));
            requests.len() == 1
        };

        let mut served = page.limit + self.overfill;
        if let Some(cap) = self.max_rows_per_page {
            served = served.min(cap);
        }
        let start = page.offset.min(self.listings.len());
        let end = (start + served).min(self.listings.len());

        let total = if first {
            self.reported_total
        } else {
            self.later_total.unwrap_or(self.reported_total)
        };

        Ok(SearchPage {
            paging: Paging {
                total,
                offset: page.offset,
                limit: page.limit,
            },
            results: self.listings[start..end].to_vec(),
            url: Some(format!(
                "https://api.mercadolibre.com/sites/MLB/search?offset={}&limit={}",
                page.offset, page.limit
            )),
        })
    }

    async fn category(&self, category_id: &str) -> Result<CategoryInfo> {
        self.category_requests
            .lock()
            .unwrap()
            .push(category_id.to_string());
        if self.fail_categories {
            return Err(ScoutError::HttpStatus {
                status: 503,
                url: format!("https://api.mercadolibre.com/categories/{category_id}"),
            });
        }
        self.categories
            .get(category_id)
            .cloned()
            .ok_or_else(|| ScoutError::CategoryNotFound(category_id.to_string()))
    }

    async fn site_categories(&self, _site_id: &str) -> Result<Vec<CategorySummary>> {
        Ok(self.site_categories.clone())
    }

    async fn visits(&self, item_ids: &[String], window: VisitWindow) -> Result<Vec<ItemVisits>> {
        self.visits_requests
            .lock()
            .unwrap()
            .push((item_ids.to_vec(), window));
        Ok(self
            .visits
            .iter()
            .filter(|v| item_ids.contains(&v.item_id))
            .cloned()
            .collect())
    }

    fn source_name(&self) -> &'static str {
        "Fake"
    }
}
