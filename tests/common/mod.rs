//! Shared harness: a real server on an ephemeral port, driven with reqwest.

#![allow(dead_code)]

use std::sync::Arc;

use autovault::{
    build_app,
    client::{ListingSource, LocalSource, RemoteSource},
    config::Settings,
    models::Listing,
    sample::sample_listings,
    store::{ListingStore, MemoryStore},
    AppState,
};
use reqwest::Client;
use tokio::net::TcpListener;

pub struct TestApp {
    pub base_url: String,
    pub client: Client,
    pub store: Arc<dyn ListingStore>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_html(&self, path: &str) -> (reqwest::StatusCode, scraper::Html) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status();
        let body = resp.text().await.unwrap();
        (status, scraper::Html::parse_document(&body))
    }
}

pub enum Source {
    Local,
    Remote(String),
}

pub async fn spawn_with(listings: Vec<Listing>, settings: Settings, source: Source) -> TestApp {
    let store: Arc<dyn ListingStore> = Arc::new(MemoryStore::with_listings(listings));
    let source: Arc<dyn ListingSource> = match source {
        Source::Local => Arc::new(LocalSource::new(store.clone())),
        Source::Remote(base_url) => Arc::new(RemoteSource::new(Arc::new(Client::new()), base_url)),
    };

    let app = build_app(AppState {
        settings: Arc::new(settings),
        store: store.clone(),
        source,
    });

    // --- Bind to random port ---
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });

    TestApp { base_url: format!("http://{}", addr), client: Client::new(), store }
}

pub async fn spawn_app() -> TestApp {
    spawn_with(sample_listings(), Settings::default(), Source::Local).await
}

pub fn select_all<'a>(html: &'a scraper::Html, selector: &str) -> Vec<scraper::ElementRef<'a>> {
    let selector = scraper::Selector::parse(selector).unwrap();
    html.select(&selector).collect()
}

pub fn text_of(element: &scraper::ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

pub fn new_listing_body() -> serde_json::Value {
    serde_json::json!({
        "title": "Mercedes-Benz C-Class 2022",
        "make": "Mercedes-Benz",
        "model": "C-Class",
        "year": 2022,
        "price": 70000,
        "mileage": "8,000 Miles",
        "fuelType": "Petrol",
        "transmission": "Automatic",
        "color": "Silver",
        "seats": 5,
        "images": ["assets/images/portfolio/31.webp"],
        "description": "Compact executive saloon with a full service history.",
        "features": ["Heated Seats"],
        "seller": {
            "name": "Jonathan Doe",
            "phone": "+1-654-452-1505",
            "email": "jonathan@autovault.com",
            "location": "280 Augusta Avenue, Toronto"
        }
    })
}
