//! Listing retrieval for the catalog and detail pages.
//!
//! A [`ListingSource`] answers `fetch(query) -> {cars, filters}`; the local source
//! evaluates queries in-process against the store (mock mode), the remote source
//! calls the REST API. [`ListingFetcher`] wraps either one and keeps the page's
//! loading indicator and error message in step with each call.

use crate::{
    catalog,
    error::FetchError,
    filters::FilterState,
    models::{CarsResponse, Facets, Listing},
    store::ListingStore,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

#[async_trait]
pub trait ListingSource: Send + Sync {
    // `query` is an encoded filter query string, with or without the leading '?'.
    async fn search(&self, query: &str) -> Result<CarsResponse, FetchError>;

    async fn listing(&self, id: &str) -> Result<Listing, FetchError>;
}

// Evaluates queries against the store without crossing the network; facets are
// derived from the filtered items here rather than by the API.
pub struct LocalSource {
    store: Arc<dyn ListingStore>,
}

impl LocalSource {
    pub fn new(store: Arc<dyn ListingStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ListingSource for LocalSource {
    async fn search(&self, query: &str) -> Result<CarsResponse, FetchError> {
        let listings = self
            .store
            .list()
            .await
            .map_err(|e| FetchError::Server { status: 500, body: format!("{:#}", e) })?;
        Ok(catalog::search(listings, &FilterState::decode(query)))
    }

    async fn listing(&self, id: &str) -> Result<Listing, FetchError> {
        match self.store.get(id).await {
            Ok(Some(listing)) => Ok(listing),
            Ok(None) => Err(FetchError::NotFound),
            Err(e) => Err(FetchError::Server { status: 500, body: format!("{:#}", e) }),
        }
    }
}

// Talks to `GET {base}/cars?<filters>` and `GET {base}/cars/:id`.
pub struct RemoteSource {
    http_client: Arc<Client>,
    base_url: String,
}

impl RemoteSource {
    pub fn new(http_client: Arc<Client>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http_client, base_url }
    }

    fn cars_url(&self, query: &str) -> String {
        let query = query.trim_start_matches('?');
        if query.is_empty() {
            format!("{}/cars", self.base_url)
        } else {
            format!("{}/cars?{}", self.base_url, query)
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        tracing::debug!("Fetching from URL: {}", url);
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "[Failed to read response body]".to_string());
            tracing::debug!(status = %status, response_body = %body, "API error response");
            return Err(FetchError::Server { status: status.as_u16(), body });
        }
        response.json::<T>().await.map_err(|e| FetchError::Decode(e.to_string()))
    }
}

// API envelope with the items left undecoded, so one bad item only costs itself.
#[derive(Debug, Deserialize, Default)]
struct RawCarsResponse {
    #[serde(default)]
    cars: Vec<Value>,
    #[serde(default)]
    filters: Facets,
}

impl RawCarsResponse {
    fn into_response(self) -> CarsResponse {
        let mut cars = Vec::with_capacity(self.cars.len());
        for item in self.cars {
            let id = item.get("_id").and_then(Value::as_str).unwrap_or("?").to_string();
            match serde_json::from_value::<Listing>(item) {
                Ok(listing) => cars.push(listing),
                Err(e) => tracing::warn!("Skipping unreadable car {} in API response: {}", id, e),
            }
        }
        CarsResponse { cars, filters: self.filters }
    }
}

#[async_trait]
impl ListingSource for RemoteSource {
    async fn search(&self, query: &str) -> Result<CarsResponse, FetchError> {
        let url = self.cars_url(query);
        let raw: RawCarsResponse = self.get_json(&url).await?;
        let data = raw.into_response();
        tracing::debug!("Successfully fetched cars: {}", data.cars.len());
        Ok(data)
    }

    async fn listing(&self, id: &str) -> Result<Listing, FetchError> {
        // Ids are opaque; keep them from smuggling in extra path segments or a query
        let id: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
        let url = format!("{}/cars/{}", self.base_url, id);
        self.get_json(&url).await
    }
}

// Loading indicator and error message of one page. Every fetch shows the
// indicator for its whole duration and clears it however the call ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageStatus {
    pub loading: bool,
    pub error_message: Option<String>,
}

impl PageStatus {
    fn begin(&mut self) {
        self.loading = true;
        self.error_message = None;
    }

    fn finish<T>(&mut self, result: &Result<T, FetchError>) {
        self.loading = false;
        if let Err(e) = result {
            // Full details go to the log only
            tracing::error!("Error fetching cars: {}", e);
            self.error_message = Some(e.user_message().to_string());
        }
    }
}

#[derive(Clone)]
pub struct ListingFetcher {
    source: Arc<dyn ListingSource>,
}

impl ListingFetcher {
    pub fn new(source: Arc<dyn ListingSource>) -> Self {
        Self { source }
    }

    pub async fn fetch(&self, query: &str, status: &mut PageStatus) -> Result<CarsResponse, FetchError> {
        tracing::debug!("Fetching cars with query: {:?}", query);
        status.begin();
        let result = self.source.search(query).await;
        status.finish(&result);
        result
    }

    pub async fn fetch_by_id(&self, id: &str, status: &mut PageStatus) -> Result<Listing, FetchError> {
        tracing::debug!("Fetching car details for ID: {}", id);
        status.begin();
        let result = self.source.listing(id).await;
        status.finish(&result);
        result
    }
}
