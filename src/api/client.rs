use crate::api::traits::MarketplaceApi;
use crate::api::types::{ItemVisits, SearchPage};
use crate::config::Config;
use crate::error::{Result, ScoutError};
use crate::models::{CategoryInfo, CategorySummary, PageRequest, VisitWindow};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// MercadoLibre public API client
pub struct MeliClient {
    client: Client,
    base_url: String,
    site_id: String,
}

impl MeliClient {
    /// Create a client for the given config's API url, site and timeout
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let client = client_builder(config).build()?;
        Ok(Self::with_client(client, config))
    }

    fn with_client(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            site_id: config.site_id.clone(),
        }
    }

    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    /// GET a JSON document. Returns the body plus the final request URL.
    async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<(T, String)>
    where
        T: DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Fetching URL: {}", url);

        let response = self.client.get(&url).query(query).send().await?;
        let final_url = response.url().to_string();
        let status = response.status();

        if !status.is_success() {
            warn!("{} returned status: {}", final_url, status);
            return Err(ScoutError::HttpStatus {
                status: status.as_u16(),
                url: final_url,
            });
        }

        let body = response.bytes().await?;
        debug!("Downloaded {} bytes from {}", body.len(), final_url);

        let parsed = serde_json::from_slice(&body)?;
        Ok((parsed, final_url))
    }
}

fn client_builder(config: &Config) -> ClientBuilder {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.as_str())
}

#[async_trait]
impl MarketplaceApi for MeliClient {
    async fn search_page(&self, page: &PageRequest<'_>) -> Result<SearchPage> {
        let path = format!("/sites/{}/search", self.site_id);
        let (mut search, url): (SearchPage, String) =
            self.get_json(&path, &page.query_params()).await?;
        search.url = Some(url);
        Ok(search)
    }

    async fn category(&self, category_id: &str) -> Result<CategoryInfo> {
        let path = format!("/categories/{}", category_id);
        let no_params: [(&str, &str); 0] = [];
        match self.get_json(&path, &no_params).await {
            Ok((info, _)) => Ok(info),
            Err(ScoutError::HttpStatus { status, .. })
                if status == StatusCode::NOT_FOUND.as_u16() =>
            {
                Err(ScoutError::CategoryNotFound(category_id.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn site_categories(&self, site_id: &str) -> Result<Vec<CategorySummary>> {
        let path = format!("/sites/{}/categories", site_id);
        let no_params: [(&str, &str); 0] = [];
        let (categories, _) = self.get_json(&path, &no_params).await?;
        Ok(categories)
    }

    async fn visits(&self, item_ids: &[String], window: VisitWindow) -> Result<Vec<ItemVisits>> {
        let params = [
            ("ids", item_ids.join(",")),
            ("last", window.last.to_string()),
            ("unit", window.unit.as_str().to_string()),
        ];
        let (visits, _) = self
            .get_json("/items/visits/time_window", &params)
            .await?;
        Ok(visits)
    }

    fn source_name(&self) -> &'static str {
        "MercadoLibre"
    }
}
