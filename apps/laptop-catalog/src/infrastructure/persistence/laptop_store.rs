//! In-memory laptop store.
//!
//! # Locking
//!
//! The map sits behind a `tokio::sync::RwLock`. `save` takes the write
//! lock; `find` takes the read lock. `search` holds one read guard for the
//! whole enumeration, including the awaited sends to the receiver, so it
//! sees a consistent snapshot and writers wait until it finishes. A slow
//! search client therefore delays concurrent creates until the search
//! completes, or until the gRPC layer drops it once the call's deadline
//! passes or its client disconnects.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{CallContext, LaptopStore, MessageSink, StoreError};
use crate::domain::filter::{self, Filter};
use crate::domain::laptop::Laptop;

/// In-memory implementation of `LaptopStore`.
#[derive(Debug, Default)]
pub struct InMemoryLaptopStore {
    laptops: RwLock<HashMap<String, Laptop>>,
}

impl InMemoryLaptopStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LaptopStore for InMemoryLaptopStore {
    async fn save(&self, laptop: &Laptop) -> Result<(), StoreError> {
        let mut laptops = self.laptops.write().await;
        if laptops.contains_key(&laptop.id) {
            return Err(StoreError::AlreadyExists(laptop.id.clone()));
        }

        laptops.insert(laptop.id.clone(), laptop.clone());
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Laptop, StoreError> {
        let laptops = self.laptops.read().await;
        laptops
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn search(
        &self,
        ctx: &CallContext,
        filter: &Filter,
        found: &mut dyn MessageSink<Laptop>,
    ) -> Result<(), StoreError> {
        let laptops = self.laptops.read().await;

        for laptop in laptops.values() {
            ctx.check()?;

            if filter::matches(filter, laptop) {
                found.send(laptop.clone()).await?;
            }
        }

        Ok(())
    }

    async fn len(&self) -> usize {
        self.laptops.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{Interrupted, StreamError};
    use crate::domain::laptop::Memory;
    use crate::test_support::{laptop_with, sample_laptop};
    use std::sync::Arc;

    fn open_filter() -> Filter {
        Filter {
            max_price_usd: f64::MAX,
            ..Filter::default()
        }
    }

    #[tokio::test]
    async fn save_then_find_returns_equal_copy() {
        let store = InMemoryLaptopStore::new();
        let laptop = sample_laptop();

        store.save(&laptop).await.unwrap();

        assert_eq!(store.find(&laptop.id).await.unwrap(), laptop);
    }

    #[tokio::test]
    async fn save_twice_is_already_exists() {
        let store = InMemoryLaptopStore::new();
        let laptop = sample_laptop();

        store.save(&laptop).await.unwrap();
        let err = store.save(&laptop).await.unwrap_err();

        assert_eq!(err, StoreError::AlreadyExists(laptop.id.clone()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn find_missing_is_not_found() {
        let store = InMemoryLaptopStore::new();
        let err = store.find("missing").await.unwrap_err();
        assert_eq!(err, StoreError::NotFound("missing".to_string()));
    }

    #[tokio::test]
    async fn mutating_a_returned_copy_does_not_leak() {
        let store = InMemoryLaptopStore::new();
        let mut laptop = sample_laptop();
        store.save(&laptop).await.unwrap();

        laptop.name = "changed after save".to_string();
        let mut copy = store.find(&laptop.id).await.unwrap();
        copy.gpus.clear();
        copy.cpu.cores = 64;

        let again = store.find(&laptop.id).await.unwrap();
        assert_eq!(again.name, "XPS 13");
        assert_eq!(again.gpus.len(), 1);
        assert_eq!(again.cpu.cores, 4);
    }

    #[tokio::test]
    async fn search_streams_only_matches() {
        let store = InMemoryLaptopStore::new();
        let cheap = laptop_with(2000.0, 4, 2.2, Memory::gigabytes(16));
        let pricey = laptop_with(3500.0, 8, 2.9, Memory::gigabytes(32));
        store.save(&cheap).await.unwrap();
        store.save(&pricey).await.unwrap();

        let filter = Filter {
            max_price_usd: 3000.0,
            min_cpu_cores: 4,
            min_cpu_ghz: 2.0,
            min_ram: Some(Memory::gigabytes(8)),
        };
        let mut found: Vec<Laptop> = Vec::new();
        store
            .search(&CallContext::new(), &filter, &mut found)
            .await
            .unwrap();

        assert_eq!(found, vec![cheap]);
    }

    #[tokio::test]
    async fn search_stops_when_cancelled() {
        let store = InMemoryLaptopStore::new();
        store.save(&sample_laptop()).await.unwrap();

        let ctx = CallContext::new();
        ctx.cancel();
        let mut found: Vec<Laptop> = Vec::new();
        let err = store
            .search(&ctx, &open_filter(), &mut found)
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::Interrupted(Interrupted::Canceled));
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn search_propagates_sink_failure() {
        let store = InMemoryLaptopStore::new();
        store.save(&sample_laptop()).await.unwrap();

        let (mut tx, rx) = tokio::sync::mpsc::channel::<Laptop>(1);
        drop(rx);
        let err = store
            .search(&CallContext::new(), &open_filter(), &mut tx)
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::Sink(StreamError::Closed));
    }

    #[tokio::test]
    async fn concurrent_saves_keep_every_record() {
        let store = Arc::new(InMemoryLaptopStore::new());
        let mut handles = Vec::new();

        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.save(&sample_laptop()).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len().await, 16);
        assert!(!store.is_empty().await);
    }
}
