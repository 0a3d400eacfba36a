// Catalog page logic that runs independently of how the page is drawn.

pub mod controller;
pub mod debounce;
pub mod fetcher;
pub mod price_range;
pub mod view;

pub use controller::{CatalogController, UiEvent};
pub use fetcher::{ListingFetcher, ListingSource, LocalSource, PageStatus, RemoteSource};
