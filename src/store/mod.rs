// Document store seam. The API handlers and the local listing source only see
// `ListingStore`; the backing store is picked from settings at startup.

use crate::models::Listing;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::try_join_all;

mod firestore;
mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Listing>>;

    async fn get(&self, id: &str) -> Result<Option<Listing>>;

    // Persists a new listing. An empty id is replaced by a generated one.
    async fn insert(&self, listing: Listing) -> Result<Listing>;

    // Overwrites an existing listing; Ok(None) when no listing has that id.
    async fn replace(&self, listing: Listing) -> Result<Option<Listing>>;

    // Ok(false) when no listing has that id.
    async fn delete(&self, id: &str) -> Result<bool>;
}

// Inserts the given listings when the store holds none. Returns how many were written.
pub async fn seed_if_empty(store: &dyn ListingStore, listings: Vec<Listing>) -> Result<usize> {
    let existing = store.list().await.context("Failed to inspect store before seeding")?;
    if !existing.is_empty() {
        tracing::info!("Store already holds {} listings, skipping seed.", existing.len());
        return Ok(0);
    }

    let inserted = try_join_all(listings.into_iter().map(|listing| store.insert(listing)))
        .await
        .context("Failed to seed sample listings")?;
    tracing::info!("Seeded {} sample listings.", inserted.len());
    Ok(inserted.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_listings;

    #[tokio::test]
    async fn seeding_only_happens_once() {
        let store = MemoryStore::new();
        assert_eq!(seed_if_empty(&store, sample_listings()).await.unwrap(), 5);
        assert_eq!(seed_if_empty(&store, sample_listings()).await.unwrap(), 0);
        assert_eq!(store.list().await.unwrap().len(), 5);
    }
}
