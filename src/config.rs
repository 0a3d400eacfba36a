// Settings loaded with the 'config' crate: defaults, then config.toml, then APP_* env vars.

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Memory,
    Firestore,
}

// Where the catalog page gets its listings: in-process (mock mode) or the REST API.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Local,
    Remote,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Settings {
    pub server_address: String,
    pub static_dir: String,
    pub store: StoreKind,
    pub seed_sample_data: bool,
    pub listing_source: SourceKind,
    pub api_base_url: String,
    // Firestore document store
    pub firebase_project_id: Option<String>,
    pub firestore_collection: String,
    pub firestore_base_url: String,
    pub google_application_credentials: Option<String>,
    // Catalog page
    pub page_size: usize,
    pub price_floor: i64,
    pub price_ceiling: i64,
    pub price_gap_percent: f64,
    pub price_debounce_ms: u64,
    pub search_debounce_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_address: "127.0.0.1:3001".into(),
            static_dir: "static".into(),
            store: StoreKind::Memory,
            seed_sample_data: true,
            listing_source: SourceKind::Local,
            api_base_url: "http://localhost:3001/api".into(),
            firebase_project_id: None,
            firestore_collection: "cars".into(),
            firestore_base_url: "https://firestore.googleapis.com/v1".into(),
            google_application_credentials: None,
            page_size: 8,
            price_floor: 35_000,
            price_ceiling: 95_000,
            price_gap_percent: 10.0,
            price_debounce_ms: 300,
            search_debounce_ms: 500,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let builder = Config::builder()
            // Load from a configuration file (e.g., config.toml)
            .add_source(File::with_name("config").required(false))
            // Load from environment variables (e.g., APP_SERVER_ADDRESS)
            .add_source(Environment::with_prefix("APP").try_parsing(true));

        // Missing keys fall back to Default through #[serde(default)]
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.check()?;
        Ok(settings)
    }

    fn check(&self) -> Result<()> {
        if self.page_size == 0 {
            anyhow::bail!("page_size must be at least 1");
        }
        if self.price_ceiling <= self.price_floor {
            anyhow::bail!(
                "price_ceiling ({}) must be above price_floor ({})",
                self.price_ceiling,
                self.price_floor
            );
        }
        if !(0.0..100.0).contains(&self.price_gap_percent) {
            anyhow::bail!("price_gap_percent must be within [0, 100)");
        }
        Ok(())
    }

    pub fn price_debounce(&self) -> Duration {
        Duration::from_millis(self.price_debounce_ms)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_drag_slider_domain() {
        let settings = Settings::default();
        assert_eq!(settings.server_address, "127.0.0.1:3001");
        assert_eq!((settings.price_floor, settings.price_ceiling), (35_000, 95_000));
        assert_eq!(settings.price_debounce(), Duration::from_millis(300));
        assert_eq!(settings.page_size, 8);
        assert!(settings.check().is_ok());
    }

    #[test]
    fn inverted_price_domain_is_rejected() {
        let settings = Settings { price_floor: 100_000, ..Settings::default() };
        assert!(settings.check().is_err());
    }
}
