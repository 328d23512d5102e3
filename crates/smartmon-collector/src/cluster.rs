//! Cluster membership and node identity metadata seam.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use smartmon_types::{NodeId, Result};

/// Membership collaborator: which nodes exist, and what host each one runs
/// on.
///
/// Hostnames feed series-name derivation, so `hostname` returning `None`
/// makes a node unscrapeable ([`smartmon_types::SmartError::MetadataUnavailable`]
/// in the orchestrator).
#[async_trait]
pub trait ClusterView: Send + Sync {
    /// The current fleet membership.
    async fn nodes(&self) -> Result<Vec<NodeId>>;

    /// The hostname a node runs on, or `None` when no metadata is known.
    async fn hostname(&self, node: &NodeId) -> Result<Option<String>>;
}

#[async_trait]
impl<T: ClusterView + ?Sized> ClusterView for Arc<T> {
    async fn nodes(&self) -> Result<Vec<NodeId>> {
        (**self).nodes().await
    }
    async fn hostname(&self, node: &NodeId) -> Result<Option<String>> {
        (**self).hostname(node).await
    }
}

// ---------------------------------------------------------------------------
// Mock implementation
// ---------------------------------------------------------------------------

/// In-memory [`ClusterView`] for tests and standalone runs.
pub struct MockClusterView {
    members: Mutex<Vec<NodeId>>,
    hosts: Mutex<HashMap<NodeId, String>>,
}

impl MockClusterView {
    pub fn new() -> Self {
        Self {
            members: Mutex::new(Vec::new()),
            hosts: Mutex::new(HashMap::new()),
        }
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Register a node with its hostname.
    pub fn add_node(&self, node: NodeId, host: impl Into<String>) {
        self.hosts.lock().insert(node.clone(), host.into());
        self.members.lock().push(node);
    }

    /// Register a node with no hostname metadata.
    pub fn add_node_without_host(&self, node: NodeId) {
        self.members.lock().push(node);
    }
}

impl Default for MockClusterView {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClusterView for MockClusterView {
    async fn nodes(&self) -> Result<Vec<NodeId>> {
        Ok(self.members.lock().clone())
    }

    async fn hostname(&self, node: &NodeId) -> Result<Option<String>> {
        Ok(self.hosts.lock().get(node).cloned())
    }
}
