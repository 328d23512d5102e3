//! In-memory object namespace backed by nested `BTreeMap`s.
//!
//! Fully functional backend for tests and single-process deployments. All
//! data lives behind a `parking_lot::RwLock`; clones share state.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use smartmon_types::{Result, SmartError};

use crate::object::ObjectStore;

type Namespace = BTreeMap<String, BTreeMap<String, Vec<u8>>>;

/// In-memory [`ObjectStore`] implementation.
#[derive(Clone)]
pub struct MemObjectStore {
    pool: String,
    objects: Arc<RwLock<Namespace>>,
    injected_failure: Arc<Mutex<Option<SmartError>>>,
}

impl MemObjectStore {
    /// Create an empty namespace with the given pool name (used only in
    /// error messages).
    pub fn new(pool: impl Into<String>) -> Self {
        Self {
            pool: pool.into(),
            objects: Arc::new(RwLock::new(BTreeMap::new())),
            injected_failure: Arc::new(Mutex::new(None)),
        }
    }

    /// Number of objects currently present.
    pub fn object_count(&self) -> usize {
        self.objects.read().len()
    }

    /// Make every subsequent operation fail with the given error, until
    /// [`Self::clear_failure`] is called. Test hook for unreachable-storage
    /// paths.
    pub fn inject_failure(&self, err: SmartError) {
        *self.injected_failure.lock() = Some(err);
    }

    /// Remove an injected failure.
    pub fn clear_failure(&self) {
        *self.injected_failure.lock() = None;
    }

    fn check_failure(&self) -> Result<()> {
        match &*self.injected_failure.lock() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl Default for MemObjectStore {
    fn default() -> Self {
        Self::new("smart_data")
    }
}

#[async_trait]
impl ObjectStore for MemObjectStore {
    async fn put_entry(&self, object: &str, key: &str, value: &[u8]) -> Result<()> {
        self.check_failure()?;
        let mut objects = self.objects.write();
        objects
            .entry(object.to_string())
            .or_default()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn get_entry(&self, object: &str, key: &str) -> Result<Option<Vec<u8>>> {
        self.check_failure()?;
        let objects = self.objects.read();
        Ok(objects.get(object).and_then(|map| map.get(key).cloned()))
    }

    async fn read_object(&self, object: &str) -> Result<BTreeMap<String, Vec<u8>>> {
        self.check_failure()
            .map_err(|_| SmartError::NotFound(format!("{}/{}", self.pool, object)))?;
        let objects = self.objects.read();
        Ok(objects.get(object).cloned().unwrap_or_default())
    }

    async fn last_key(&self, object: &str) -> Result<Option<String>> {
        self.check_failure()?;
        let objects = self.objects.read();
        Ok(objects
            .get(object)
            .and_then(|map| map.keys().next_back().cloned()))
    }

    async fn list_objects(&self) -> Result<Vec<String>> {
        self.check_failure()?;
        let objects = self.objects.read();
        Ok(objects.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_creates_object() {
        let store = MemObjectStore::default();
        assert_eq!(store.object_count(), 0);

        store.put_entry("host:sda", "k1", b"v1").await.unwrap();
        assert_eq!(store.object_count(), 1);
        assert_eq!(
            store.get_entry("host:sda", "k1").await.unwrap(),
            Some(b"v1".to_vec())
        );
    }

    #[tokio::test]
    async fn test_put_overwrites_same_key() {
        let store = MemObjectStore::default();
        store.put_entry("obj", "k", b"first").await.unwrap();
        store.put_entry("obj", "k", b"second").await.unwrap();

        let map = store.read_object("obj").await.unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["k"], b"second");
    }

    #[tokio::test]
    async fn test_read_absent_object_is_empty() {
        let store = MemObjectStore::default();
        let map = store.read_object("nothing-here").await.unwrap();
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn test_last_key_ordering() {
        let store = MemObjectStore::default();
        store.put_entry("obj", "20240102-000000", b"b").await.unwrap();
        store.put_entry("obj", "20240101-000000", b"a").await.unwrap();
        store.put_entry("obj", "20240103-000000", b"c").await.unwrap();

        assert_eq!(
            store.last_key("obj").await.unwrap(),
            Some("20240103-000000".to_string())
        );
        assert_eq!(store.last_key("empty").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_objects() {
        let store = MemObjectStore::default();
        store.put_entry("b-obj", "k", b"v").await.unwrap();
        store.put_entry("a-obj", "k", b"v").await.unwrap();

        let names = store.list_objects().await.unwrap();
        assert_eq!(names, vec!["a-obj".to_string(), "b-obj".to_string()]);

        // Restartable: enumerating again yields the same list.
        assert_eq!(store.list_objects().await.unwrap(), names);
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let store = MemObjectStore::default();
        let clone = store.clone();
        store.put_entry("obj", "k", b"v").await.unwrap();
        assert_eq!(clone.get_entry("obj", "k").await.unwrap(), Some(b"v".to_vec()));
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = MemObjectStore::default();
        store.inject_failure(SmartError::StorageUnavailable("pool down".into()));

        assert!(store.put_entry("obj", "k", b"v").await.is_err());
        assert!(matches!(
            store.list_objects().await.unwrap_err(),
            SmartError::StorageUnavailable(_)
        ));
        // A failing backend read surfaces as NotFound for the named object.
        assert!(matches!(
            store.read_object("obj").await.unwrap_err(),
            SmartError::NotFound(_)
        ));

        store.clear_failure();
        store.put_entry("obj", "k", b"v").await.unwrap();
    }
}
