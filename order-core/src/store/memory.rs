use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;

use super::{
    factory::{StoreConfig, StoreFactory},
    slot::{SlotStore, StoreError},
};

/// Process-local [`SlotStore`].
///
/// An optional byte quota mimics browser storage limits: a write whose
/// total footprint would exceed it fails with [`StoreError::QuotaExceeded`]
/// and leaves the previous value in place.
#[derive(Debug, Default)]
pub struct MemorySlotStore {
    slots: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            slots: Mutex::default(),
            quota: Some(quota),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.slots
            .lock()
            .map_err(|_| StoreError::Storage("memory store lock poisoned".to_string()))
    }
}

fn footprint(
    slots: &HashMap<String, String>,
    replacing: &str,
) -> usize {
    slots
        .iter()
        .filter(|(key, _)| key.as_str() != replacing)
        .map(|(key, value)| key.len() + value.len())
        .sum()
}

#[async_trait]
impl SlotStore for MemorySlotStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut slots = self.lock()?;
        if let Some(quota) = self.quota {
            let needed = footprint(&slots, key) + key.len() + value.len();
            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// [`StoreFactory`] for the `"memory"` backend. `location` is ignored.
pub struct MemoryStoreFactory;

#[async_trait]
impl StoreFactory for MemoryStoreFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, _config: &StoreConfig) -> Result<Box<dyn SlotStore>, StoreError> {
        Ok(Box::new(MemorySlotStore::new()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn get_absent_key_is_none() {
        let store = MemorySlotStore::new();

        assert_eq!(store.get("missing").await, Ok(None));
    }

    #[tokio::test]
    async fn put_then_get_returns_latest_value() {
        let store = MemorySlotStore::new();
        store.put("k", "first").await.unwrap();
        store.put("k", "second").await.unwrap();

        assert_eq!(store.get("k").await, Ok(Some("second".to_string())));
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = MemorySlotStore::new();
        store.put("k", "v").await.unwrap();

        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();

        assert_eq!(store.get("k").await, Ok(None));
    }

    #[tokio::test]
    async fn quota_rejects_oversized_write_and_keeps_old_value() {
        let store = MemorySlotStore::with_quota(8);
        store.put("k", "1234").await.unwrap();

        let result = store.put("k", "123456789").await;

        assert_eq!(
            result,
            Err(StoreError::QuotaExceeded {
                needed: 10,
                quota: 8
            })
        );
        assert_eq!(store.get("k").await, Ok(Some("1234".to_string())));
    }

    #[tokio::test]
    async fn quota_counts_the_replaced_value_once() {
        let store = MemorySlotStore::with_quota(6);
        store.put("k", "12345").await.unwrap();

        // Replacing in place must not count the old value.
        assert_eq!(store.put("k", "54321").await, Ok(()));
    }

    #[tokio::test]
    async fn factory_creates_an_empty_store() {
        let store = MemoryStoreFactory
            .create(&StoreConfig::default())
            .await
            .unwrap();

        assert_eq!(store.get("anything").await, Ok(None));
    }
}
