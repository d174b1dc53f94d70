//! In-memory collaborator implementations.
//!
//! Used by unit and integration tests, and as the counter backend for
//! single-node deployments where no shared counter store is configured.
//! Both stores can be switched unavailable to exercise failure paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;
use futures_util::StreamExt;

use super::{BodyStream, CounterStore, ObjectMetadata, ObjectStore, StoreError};

/// One stored object.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: Option<String>,
    pub etag: Option<String>,
}

/// In-memory object store.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    unavailable: AtomicBool,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object with optional content type; the etag is derived from
    /// the body length so repeated identical inserts stay stable.
    pub fn put_object(&self, key: &str, data: impl Into<Bytes>, content_type: Option<&str>) {
        let data = data.into();
        let etag = format!("\"mem-{:x}\"", data.len());
        self.objects.lock().expect("object store mutex poisoned").insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.map(str::to_string),
                etag: Some(etag),
            },
        );
    }

    /// Simulate an outage: all subsequent calls fail with `Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("injected outage".to_string()))
        } else {
            Ok(())
        }
    }

    fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .expect("object store mutex poisoned")
            .get(key)
            .cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn metadata(&self, key: &str) -> Result<Option<ObjectMetadata>, StoreError> {
        self.check_available()?;
        Ok(self.object(key).map(|obj| ObjectMetadata {
            size: obj.data.len() as u64,
            content_type: obj.content_type,
            etag: obj.etag,
        }))
    }

    async fn body(&self, key: &str) -> Result<BodyStream, StoreError> {
        self.check_available()?;
        let obj = self.object(key).ok_or(StoreError::NotFound)?;
        Ok(stream::iter([Ok(obj.data)]).boxed())
    }

    async fn body_range(&self, key: &str, start: u64, end: u64) -> Result<BodyStream, StoreError> {
        self.check_available()?;
        let obj = self.object(key).ok_or(StoreError::NotFound)?;
        let slice = obj.data.slice(start as usize..=end as usize);
        Ok(stream::iter([Ok(slice)]).boxed())
    }
}

/// In-memory counter store with per-key expiry.
#[derive(Default)]
pub struct MemoryCounterStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
    unavailable: AtomicBool,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: all subsequent calls fail with `Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("injected outage".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check_available()?;
        let mut entries = self.entries.lock().expect("counter store mutex poisoned");
        match entries.get(key) {
            Some((_, expires)) if *expires <= Instant::now() => {
                entries.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        self.check_available()?;
        let expires = Instant::now() + Duration::from_secs(ttl_secs);
        self.entries
            .lock()
            .expect("counter store mutex poisoned")
            .insert(key.to_string(), (value.to_string(), expires));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;

    #[tokio::test]
    async fn metadata_and_body_round_trip() {
        let store = MemoryObjectStore::new();
        store.put_object("a/b.txt", &b"hello world"[..], Some("text/plain"));

        let meta = store.metadata("a/b.txt").await.unwrap().unwrap();
        assert_eq!(meta.size, 11);
        assert_eq!(meta.content_type.as_deref(), Some("text/plain"));
        assert!(meta.etag.is_some());

        let chunks: Vec<Bytes> = store.body("a/b.txt").await.unwrap().try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"hello world");
    }

    #[tokio::test]
    async fn range_read_is_inclusive() {
        let store = MemoryObjectStore::new();
        store.put_object("k", &b"0123456789"[..], None);

        let chunks: Vec<Bytes> = store
            .body_range("k", 2, 5)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(chunks.concat(), b"2345");
    }

    #[tokio::test]
    async fn missing_metadata_is_none_and_missing_body_errors() {
        let store = MemoryObjectStore::new();
        assert!(store.metadata("nope").await.unwrap().is_none());
        assert!(matches!(store.body("nope").await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn counter_entries_expire() {
        let store = MemoryCounterStore::new();
        store.put("k", "1:0", 0).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.put("k", "2:0", 60).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("2:0"));
    }

    #[tokio::test]
    async fn injected_outage_fails_every_call() {
        let store = MemoryCounterStore::new();
        store.set_unavailable(true);
        assert!(matches!(store.get("k").await, Err(StoreError::Unavailable(_))));
        assert!(matches!(store.put("k", "v", 1).await, Err(StoreError::Unavailable(_))));
    }
}
