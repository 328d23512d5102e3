//! Scrape orchestration: fetch readings per node, append per device.

use std::collections::BTreeMap;
use std::sync::Arc;

use smartmon_store::TimeSeriesStore;
use smartmon_types::{DeviceKey, NodeId, Result, SeriesName, SeriesTimestamp, SmartError};

use crate::client::CollectionClient;
use crate::cluster::ClusterView;

/// Outcome of scraping one node.
#[derive(Debug, Clone)]
pub struct ScrapeSummary {
    pub node: NodeId,
    /// Hostname the series names were derived from.
    pub host: String,
    /// Devices whose reading was written.
    pub devices_written: usize,
    /// Per-device append failures; never fatal to the node's scrape.
    pub errors: Vec<(DeviceKey, SmartError)>,
}

/// Per-node outcomes of a fleet-wide scrape.
#[derive(Debug, Default)]
pub struct FleetScrapeSummary {
    pub outcomes: BTreeMap<NodeId, Result<ScrapeSummary>>,
}

impl FleetScrapeSummary {
    pub fn nodes_succeeded(&self) -> usize {
        self.outcomes.values().filter(|r| r.is_ok()).count()
    }

    pub fn nodes_failed(&self) -> usize {
        self.outcomes.len() - self.nodes_succeeded()
    }
}

/// Fans collection out across nodes and writes results into the store.
///
/// Append-only: this component never reads history back and never deletes.
#[derive(Clone)]
pub struct ScrapeOrchestrator {
    client: Arc<dyn CollectionClient>,
    cluster: Arc<dyn ClusterView>,
    store: TimeSeriesStore,
}

impl ScrapeOrchestrator {
    pub fn new(
        client: Arc<dyn CollectionClient>,
        cluster: Arc<dyn ClusterView>,
        store: TimeSeriesStore,
    ) -> Self {
        Self {
            client,
            cluster,
            store,
        }
    }

    /// Scrape one node: fetch its readings and append one entry per device.
    ///
    /// Fails outright only when the fetch fails or no hostname metadata
    /// exists for the node; both happen before any write, so a failed call
    /// leaves no partial writes from this call. Per-device append failures
    /// after that are collected into the summary instead.
    pub async fn scrape_one(&self, node: &NodeId) -> Result<ScrapeSummary> {
        let readings = self.client.fetch_readings(node).await?;
        let host = self
            .cluster
            .hostname(node)
            .await?
            .ok_or_else(|| SmartError::MetadataUnavailable(node.to_string()))?;

        let mut summary = ScrapeSummary {
            node: node.clone(),
            host: host.clone(),
            devices_written: 0,
            errors: Vec::new(),
        };

        for (device, reading) in readings {
            let ts = SeriesTimestamp::now();
            let series = SeriesName::from_parts(&host, &device);
            match self.store.append_entry(&series, ts, &reading).await {
                Ok(()) => summary.devices_written += 1,
                Err(e) => {
                    tracing::warn!(
                        node = %node,
                        device = %device,
                        error = %e,
                        "Failed to append device reading"
                    );
                    summary.errors.push((device, e));
                }
            }
        }

        tracing::info!(
            node = %node,
            host = %host,
            written = summary.devices_written,
            failed = summary.errors.len(),
            "Scraped node"
        );
        Ok(summary)
    }

    /// Scrape every node in the supplied set, sequentially.
    ///
    /// A single node's failure is recorded in its outcome and never aborts
    /// the remaining nodes. Concurrent fan-out is a possible extension; the
    /// contract here only requires that nodes are isolated from each other's
    /// failures.
    pub async fn scrape_all(&self, nodes: &[NodeId]) -> FleetScrapeSummary {
        let mut summary = FleetScrapeSummary::default();
        for node in nodes {
            let outcome = self.scrape_one(node).await;
            if let Err(e) = &outcome {
                tracing::warn!(node = %node, error = %e, "Node scrape failed");
            }
            summary.outcomes.insert(node.clone(), outcome);
        }
        tracing::info!(
            nodes = nodes.len(),
            succeeded = summary.nodes_succeeded(),
            failed = summary.nodes_failed(),
            "Fleet scrape finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockCollectionClient, NodeReadings};
    use crate::cluster::MockClusterView;
    use serde_json::json;
    use smartmon_store::{MemObjectStore, ObjectStore};
    use smartmon_types::Reading;

    fn readings(devices: &[&str]) -> NodeReadings {
        devices
            .iter()
            .map(|d| (DeviceKey::from(*d), Reading::new(json!({"dev": *d}))))
            .collect()
    }

    struct Fixture {
        client: Arc<MockCollectionClient>,
        cluster: Arc<MockClusterView>,
        backend: MemObjectStore,
        orchestrator: ScrapeOrchestrator,
    }

    fn fixture() -> Fixture {
        let client = MockCollectionClient::new().into_arc();
        let cluster = MockClusterView::new().into_arc();
        let backend = MemObjectStore::default();
        let store = TimeSeriesStore::new(Arc::new(backend.clone()));
        let orchestrator =
            ScrapeOrchestrator::new(client.clone(), cluster.clone(), store);
        Fixture {
            client,
            cluster,
            backend,
            orchestrator,
        }
    }

    #[tokio::test]
    async fn test_scrape_one_writes_per_device_series() {
        let f = fixture();
        let node = NodeId::from("osd.1");
        f.cluster.add_node(node.clone(), "osd1-host");
        f.client.set_readings(node.clone(), readings(&["sda", "sdb"]));

        let summary = f.orchestrator.scrape_one(&node).await.unwrap();
        assert_eq!(summary.devices_written, 2);
        assert!(summary.errors.is_empty());
        assert_eq!(summary.host, "osd1-host");

        let mut names = f.backend.list_objects().await.unwrap();
        names.sort();
        assert_eq!(names, vec!["osd1-host:sda", "osd1-host:sdb"]);
    }

    #[tokio::test]
    async fn test_scrape_same_device_appends_not_duplicates() {
        let f = fixture();
        let node = NodeId::from("osd.1");
        f.cluster.add_node(node.clone(), "h");
        f.client.set_readings(node.clone(), readings(&["sda"]));

        f.orchestrator.scrape_one(&node).await.unwrap();
        f.orchestrator.scrape_one(&node).await.unwrap();

        // Same derived object name both times.
        assert_eq!(f.backend.object_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_metadata_aborts_without_writes() {
        let f = fixture();
        let node = NodeId::from("osd.2");
        f.cluster.add_node_without_host(node.clone());
        f.client.set_readings(node.clone(), readings(&["sda"]));

        let err = f.orchestrator.scrape_one(&node).await.unwrap_err();
        assert!(matches!(err, SmartError::MetadataUnavailable(_)));
        assert_eq!(f.backend.object_count(), 0);
    }

    #[tokio::test]
    async fn test_append_failures_are_collected_not_fatal() {
        let f = fixture();
        let node = NodeId::from("osd.3");
        f.cluster.add_node(node.clone(), "h3");
        f.client.set_readings(node.clone(), readings(&["sda", "sdb"]));
        f.backend
            .inject_failure(SmartError::StorageUnavailable("pool down".into()));

        let summary = f.orchestrator.scrape_one(&node).await.unwrap();
        assert_eq!(summary.devices_written, 0);
        assert_eq!(summary.errors.len(), 2);
    }

    #[tokio::test]
    async fn test_fleet_scrape_isolates_node_failures() {
        let f = fixture();
        let (a, b, c) = (
            NodeId::from("osd.a"),
            NodeId::from("osd.b"),
            NodeId::from("osd.c"),
        );
        f.cluster.add_node(a.clone(), "host-a");
        f.cluster.add_node(b.clone(), "host-b");
        f.cluster.add_node(c.clone(), "host-c");
        f.client.set_readings(a.clone(), readings(&["sda"]));
        f.client
            .set_error(b.clone(), SmartError::unreachable("osd.b", "refused"));
        f.client.set_readings(c.clone(), readings(&["sda"]));

        let nodes = vec![a.clone(), b.clone(), c.clone()];
        let summary = f.orchestrator.scrape_all(&nodes).await;

        assert_eq!(summary.nodes_succeeded(), 2);
        assert_eq!(summary.nodes_failed(), 1);
        assert!(summary.outcomes[&a].is_ok());
        assert!(matches!(
            summary.outcomes[&b],
            Err(SmartError::NodeUnreachable { .. })
        ));
        assert!(summary.outcomes[&c].is_ok());

        // Series exist for A and C only.
        let names = f.backend.list_objects().await.unwrap();
        assert_eq!(names, vec!["host-a:sda", "host-c:sda"]);
    }
}
