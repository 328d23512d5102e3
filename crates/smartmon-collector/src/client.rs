//! The "fetch SMART data from one node" seam, plus a configurable mock.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use smartmon_types::{DeviceKey, NodeId, Reading, Result, SmartError};

/// Map from device key to its current reading, as returned by one node.
pub type NodeReadings = BTreeMap<DeviceKey, Reading>;

/// Transport abstraction for "ask node N for its current device readings".
///
/// One blocking round trip to the node's command interface; the transport is
/// expected to enforce its own deadline and report it as [`SmartError::Timeout`]
/// rather than hanging. This layer never retries; retry policy, if any,
/// belongs to the orchestrator above it.
#[async_trait]
pub trait CollectionClient: Send + Sync {
    async fn fetch_readings(&self, node: &NodeId) -> Result<NodeReadings>;
}

#[async_trait]
impl<T: CollectionClient + ?Sized> CollectionClient for Arc<T> {
    async fn fetch_readings(&self, node: &NodeId) -> Result<NodeReadings> {
        (**self).fetch_readings(node).await
    }
}

// ---------------------------------------------------------------------------
// Mock implementation
// ---------------------------------------------------------------------------

type FetchHandler = Box<dyn Fn(&NodeId) -> Result<NodeReadings> + Send + Sync>;

/// A configurable mock for [`CollectionClient`].
///
/// Per-node canned responses can be installed with [`Self::set_readings`] /
/// [`Self::set_error`], or the whole fetch can be overridden with a closure.
/// Unconfigured nodes answer `NodeUnreachable`.
pub struct MockCollectionClient {
    responses: Mutex<HashMap<NodeId, Result<NodeReadings>>>,
    fetch_handler: Mutex<Option<FetchHandler>>,
}

impl MockCollectionClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            fetch_handler: Mutex::new(None),
        }
    }

    /// Wrap in an `Arc` for convenient sharing.
    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Configure a successful response for one node.
    pub fn set_readings(&self, node: NodeId, readings: NodeReadings) {
        self.responses.lock().insert(node, Ok(readings));
    }

    /// Configure a failure for one node.
    pub fn set_error(&self, node: NodeId, err: SmartError) {
        self.responses.lock().insert(node, Err(err));
    }

    /// Override fetch entirely with a closure.
    pub fn on_fetch(&self, f: impl Fn(&NodeId) -> Result<NodeReadings> + Send + Sync + 'static) {
        *self.fetch_handler.lock() = Some(Box::new(f));
    }
}

impl Default for MockCollectionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CollectionClient for MockCollectionClient {
    async fn fetch_readings(&self, node: &NodeId) -> Result<NodeReadings> {
        if let Some(f) = self.fetch_handler.lock().as_ref() {
            return f(node);
        }
        match self.responses.lock().get(node) {
            Some(result) => result.clone(),
            None => Err(SmartError::unreachable(node.as_str(), "no such node")),
        }
    }
}
