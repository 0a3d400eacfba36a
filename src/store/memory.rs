// In-process listing store, used for local development and tests.

use super::ListingStore;
use crate::models::Listing;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryStore {
    listings: RwLock<Vec<Listing>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listings(listings: Vec<Listing>) -> Self {
        Self { listings: RwLock::new(listings) }
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Listing>> {
        Ok(self.listings.read().await.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<Listing>> {
        Ok(self.listings.read().await.iter().find(|l| l.id == id).cloned())
    }

    async fn insert(&self, mut listing: Listing) -> Result<Listing> {
        let mut listings = self.listings.write().await;
        if listing.id.is_empty() || listings.iter().any(|l| l.id == listing.id) {
            listing.id = Uuid::new_v4().simple().to_string();
        }
        listings.push(listing.clone());
        Ok(listing)
    }

    async fn replace(&self, listing: Listing) -> Result<Option<Listing>> {
        let mut listings = self.listings.write().await;
        match listings.iter_mut().find(|l| l.id == listing.id) {
            Some(slot) => {
                *slot = listing.clone();
                Ok(Some(listing))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut listings = self.listings.write().await;
        let before = listings.len();
        listings.retain(|l| l.id != id);
        Ok(listings.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_listings;

    #[tokio::test]
    async fn crud_lifecycle() {
        let store = MemoryStore::with_listings(sample_listings());

        let mut fresh = sample_listings()[2].clone();
        fresh.id = String::new();
        let created = store.insert(fresh).await.unwrap();
        assert_eq!(created.id.len(), 32);
        assert_eq!(store.list().await.unwrap().len(), 6);

        let mut changed = created.clone();
        changed.price = 79_000;
        assert!(store.replace(changed).await.unwrap().is_some());
        assert_eq!(store.get(&created.id).await.unwrap().unwrap().price, 79_000);

        assert!(store.delete(&created.id).await.unwrap());
        assert!(!store.delete(&created.id).await.unwrap());
        assert!(store.get(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replacing_unknown_id_reports_absence() {
        let store = MemoryStore::new();
        let ghost = Listing { id: "nope".into(), ..Default::default() };
        assert!(store.replace(ghost).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn colliding_ids_are_regenerated() {
        let store = MemoryStore::with_listings(sample_listings());
        let copy = store.insert(sample_listings()[0].clone()).await.unwrap();
        assert_ne!(copy.id, "1");
    }
}
