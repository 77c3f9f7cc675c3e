use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use keywatch_common::KeyHit;

use crate::KeyStore;

#[derive(Default)]
struct Inner {
    records: HashMap<String, KeyHit>,
    // Keys in store order, newest first.
    order: Vec<String>,
}

/// In-memory store with the same check-and-insert semantics as Redis.
/// Backs the test suites; nothing here survives the process.
#[derive(Default)]
pub struct MemoryKeyStore {
    inner: Mutex<Inner>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn store_if_new(&self, hit: &KeyHit) -> Result<bool> {
        let mut inner = self.inner.lock().expect("key store lock poisoned");
        if inner.records.contains_key(&hit.key) {
            return Ok(false);
        }
        inner.records.insert(hit.key.clone(), hit.clone());
        inner.order.insert(0, hit.key.clone());
        Ok(true)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let inner = self.inner.lock().expect("key store lock poisoned");
        Ok(inner.records.contains_key(key))
    }

    async fn get(&self, key: &str) -> Result<Option<KeyHit>> {
        let inner = self.inner.lock().expect("key store lock poisoned");
        Ok(inner.records.get(key).cloned())
    }

    async fn recent(&self, n: usize) -> Result<Vec<KeyHit>> {
        let inner = self.inner.lock().expect("key store lock poisoned");
        Ok(inner
            .order
            .iter()
            .take(n)
            .filter_map(|k| inner.records.get(k).cloned())
            .collect())
    }

    async fn all_keys(&self) -> Result<HashSet<String>> {
        let inner = self.inner.lock().expect("key store lock poisoned");
        Ok(inner.records.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn hit(key: &str, source: &str) -> KeyHit {
        KeyHit {
            key: key.to_string(),
            source_type: source.to_string(),
            source_url: format!("https://example.com/{source}"),
            context: format!("context for {key}"),
            found_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn store_if_new_is_idempotent() {
        let store = MemoryKeyStore::new();
        let h = hit("AAAAA-BBBBB-CCCCC-DDDDD-EEEEE", "reddit-Piracy");

        assert!(store.store_if_new(&h).await.unwrap());
        assert!(!store.store_if_new(&h).await.unwrap());
        assert!(!store.store_if_new(&h).await.unwrap());

        assert!(store.exists(&h.key).await.unwrap());
        assert_eq!(store.recent(10).await.unwrap().len(), 1);
        assert_eq!(store.all_keys().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn first_sighting_wins() {
        let store = MemoryKeyStore::new();
        let first = hit("AAAAA-BBBBB-CCCCC-DDDDD-EEEEE", "reddit-Piracy");
        let mut second = hit("AAAAA-BBBBB-CCCCC-DDDDD-EEEEE", "nulled.to");
        second.context = "different context".to_string();

        store.store_if_new(&first).await.unwrap();
        store.store_if_new(&second).await.unwrap();

        let recent = store.recent(1).await.unwrap();
        assert_eq!(recent[0].source_type, "reddit-Piracy");
        assert_eq!(recent[0].context, first.context);
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_bounded() {
        let store = MemoryKeyStore::new();
        store
            .store_if_new(&hit("AAAAA-AAAAA-AAAAA-AAAAA-AAAAA", "forum"))
            .await
            .unwrap();
        store
            .store_if_new(&hit("BBBBB-BBBBB-BBBBB-BBBBB-BBBBB", "forum"))
            .await
            .unwrap();
        store
            .store_if_new(&hit("CCCCC-CCCCC-CCCCC-CCCCC-CCCCC", "forum"))
            .await
            .unwrap();

        let recent = store.recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].key, "CCCCC-CCCCC-CCCCC-CCCCC-CCCCC");
        assert_eq!(recent[1].key, "BBBBB-BBBBB-BBBBB-BBBBB-BBBBB");
    }

    #[tokio::test]
    async fn recent_zero_is_empty() {
        let store = MemoryKeyStore::new();
        store
            .store_if_new(&hit("AAAAA-AAAAA-AAAAA-AAAAA-AAAAA", "forum"))
            .await
            .unwrap();
        assert!(store.recent(0).await.unwrap().is_empty());
    }
}
