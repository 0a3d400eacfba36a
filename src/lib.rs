use axum::{
    extract::FromRef,
    http::{header, Method},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod facets;
pub mod filters;
pub mod models;
pub mod routes;
pub mod sample;
pub mod store;

use crate::{client::ListingSource, config::Settings, store::ListingStore};

// Shared application state, handed to every handler through `State`.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Arc<dyn ListingStore>,
    pub source: Arc<dyn ListingSource>,
}

// Full application: pages, the REST API, static files, CORS and request tracing.
pub fn build_app(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::PATCH])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let static_dir = ServeDir::new(&app_state.settings.static_dir);

    routes::create_router(app_state)
        .nest_service("/static", static_dir)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
