use anyhow::{Context, Result};
use autovault::{
    build_app,
    client::{ListingSource, LocalSource, RemoteSource},
    config::{Settings, SourceKind, StoreKind},
    sample,
    store::{self, FirestoreStore, ListingStore, MemoryStore},
    AppState,
};
use reqwest::Client;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file first. Ignore errors (e.g., file not found)
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "autovault=info,tower_http=info".into()))
        .with(fmt::layer())
        .init();

    tracing::info!("Initializing AutoVault server...");

    // Load configuration
    let settings = match Settings::new() {
        Ok(s) => {
            tracing::info!("Configuration loaded successfully.");
            s
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };
    let shared_settings = Arc::new(settings);

    let http_client = Arc::new(
        Client::builder()
            .user_agent(concat!("autovault/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build shared reqwest client")?,
    );
    tracing::info!("Shared HTTP client created.");

    // --- Document store ---
    let store: Arc<dyn ListingStore> = match shared_settings.store {
        StoreKind::Memory => {
            tracing::info!("Using in-memory listing store.");
            Arc::new(MemoryStore::new())
        }
        StoreKind::Firestore => {
            let firestore = FirestoreStore::new(&shared_settings, (*http_client).clone())
                .await
                .context("Failed to initialise Firestore store")?;
            tracing::info!("Using Firestore listing store.");
            Arc::new(firestore)
        }
    };

    if shared_settings.seed_sample_data {
        if let Err(e) = store::seed_if_empty(store.as_ref(), sample::sample_listings()).await {
            // The server can still run against an empty catalog
            tracing::warn!("Failed to seed sample listings: {:?}", e);
        }
    }

    // --- Listing source for the catalog pages ---
    let source: Arc<dyn ListingSource> = match shared_settings.listing_source {
        SourceKind::Local => {
            tracing::info!("Catalog pages evaluate queries locally.");
            Arc::new(LocalSource::new(store.clone()))
        }
        SourceKind::Remote => {
            tracing::info!("Catalog pages fetch from {}", shared_settings.api_base_url);
            Arc::new(RemoteSource::new(http_client.clone(), shared_settings.api_base_url.clone()))
        }
    };

    let app_state = AppState {
        settings: shared_settings.clone(),
        store,
        source,
    };
    let app = build_app(app_state);

    // Parse the server address from settings
    let addr: SocketAddr = match shared_settings.server_address.parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(
                "Invalid server address format in configuration ('{}'): {}",
                shared_settings.server_address,
                e
            );
            return Err(anyhow::anyhow!("Invalid server address format: {}", shared_settings.server_address));
        }
    };

    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => {
            tracing::info!("Server listening on {}", addr);
            l
        }
        Err(e) => {
            tracing::error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
