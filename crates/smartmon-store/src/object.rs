use std::collections::BTreeMap;

use async_trait::async_trait;

use smartmon_types::Result;

/// The storage substrate: a namespace of named objects, each holding an
/// ordered key-value map.
///
/// Only the read/write contract is modeled here; creation, open, and close of
/// the namespace itself belong to the backend. A single `put_entry` is one
/// atomic read-modify-write against one object, so writers targeting
/// different objects never conflict and writers racing on the same
/// (object, key) pair resolve last-write-wins.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Insert or overwrite one entry, creating the object on first write.
    async fn put_entry(&self, object: &str, key: &str, value: &[u8]) -> Result<()>;

    /// Point lookup of one entry. `Ok(None)` when the object or key is absent.
    async fn get_entry(&self, object: &str, key: &str) -> Result<Option<Vec<u8>>>;

    /// Read an object's whole map in key order. An absent object reads as an
    /// empty map; only a failing backend read is an error.
    async fn read_object(&self, object: &str) -> Result<BTreeMap<String, Vec<u8>>>;

    /// The lexically-maximal key in the object, or `None` when empty/absent.
    async fn last_key(&self, object: &str) -> Result<Option<String>>;

    /// Enumerate the object names currently present in the namespace.
    ///
    /// The returned list is finite and the enumeration is restartable by
    /// calling again.
    async fn list_objects(&self) -> Result<Vec<String>>;
}
