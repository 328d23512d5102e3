//! Operator-facing operations.
//!
//! [`SmartService`] is what a command-dispatch layer calls into: status and
//! enable/disable, on-demand scrapes and dumps, and the on-demand prediction
//! run. These execute synchronously on the caller's task, independent of the
//! scheduler loop, sharing the same time-series store.

use std::sync::Arc;

use serde_json::Value;

use smartmon_collector::{
    ClusterView, CollectionClient, FleetScrapeSummary, ScrapeOrchestrator, ScrapeSummary,
};
use smartmon_config::ConfigHandle;
use smartmon_predict::{FailurePredictor, PredictionRequest};
use smartmon_query::{FleetDump, QueryEngine};
use smartmon_sched::{Scheduler, SchedulerHandle};
use smartmon_store::{ObjectStore, TimeSeriesStore};
use smartmon_types::{NodeId, Result, SeriesName};

/// Snapshot of the module's operator-visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub active: bool,
}

/// Operator-facing facade over collection, storage, query, and scheduling.
pub struct SmartService {
    config: Arc<ConfigHandle>,
    orchestrator: ScrapeOrchestrator,
    query: QueryEngine,
    cluster: Arc<dyn ClusterView>,
    predictor: Arc<dyn FailurePredictor>,
    scheduler: SchedulerHandle,
}

impl SmartService {
    /// Wire the full module together over the given substrate and
    /// collaborators.
    ///
    /// Returns the service plus the scheduler loop; the caller decides where
    /// to run the loop (the daemon spawns it, tests may drop it).
    pub fn build(
        config: Arc<ConfigHandle>,
        backend: Arc<dyn ObjectStore>,
        client: Arc<dyn CollectionClient>,
        cluster: Arc<dyn ClusterView>,
        predictor: Arc<dyn FailurePredictor>,
    ) -> (Self, Scheduler) {
        let store = TimeSeriesStore::new(backend);
        let orchestrator = ScrapeOrchestrator::new(client, cluster.clone(), store.clone());
        let query = QueryEngine::new(store);

        let (scheduler, handle) = Scheduler::new(
            config.clone(),
            orchestrator.clone(),
            cluster.clone(),
            query.clone(),
            predictor.clone(),
        );

        let service = Self {
            config,
            orchestrator,
            query,
            cluster,
            predictor,
            scheduler: handle,
        };
        (service, scheduler)
    }

    /// A handle for signalling the scheduler outside the service's own
    /// operations (e.g. for shutdown).
    pub fn scheduler_handle(&self) -> SchedulerHandle {
        self.scheduler.clone()
    }

    pub fn status(&self) -> Status {
        Status {
            active: self.config.snapshot().active,
        }
    }

    /// Enable scheduled scraping and wake the scheduler so the change takes
    /// effect now rather than after the current sleep runs out.
    pub fn enable(&self) {
        self.config.set_active(true);
        self.scheduler.wake();
        tracing::info!("Scheduled scraping enabled");
    }

    /// Disable scheduled scraping; the wake is required here too, so a
    /// pending run is re-evaluated against the new state promptly.
    pub fn disable(&self) {
        self.config.set_active(false);
        self.scheduler.wake();
        tracing::info!("Scheduled scraping disabled");
    }

    /// Scrape one node now, returning per-device write counts and errors.
    pub async fn scrape(&self, node: &NodeId) -> Result<ScrapeSummary> {
        self.orchestrator.scrape_one(node).await
    }

    /// Scrape the full current fleet membership now.
    pub async fn scrape_all(&self) -> Result<FleetScrapeSummary> {
        let nodes = self.cluster.nodes().await?;
        Ok(self.orchestrator.scrape_all(&nodes).await)
    }

    /// Dump one series as a document keyed by timestamp.
    pub async fn dump(&self, series: &SeriesName) -> Result<Value> {
        self.query.dump_one(series).await
    }

    /// Dump every series, keyed by series name.
    pub async fn dump_all(&self) -> Result<FleetDump> {
        self.query.dump_all().await
    }

    /// Run the prediction hook now, outside the schedule, over the full
    /// current set of series.
    pub async fn predict_failure(&self) -> Result<()> {
        let config = self.config.snapshot();
        let series = self.query.series_names().await?;
        self.predictor
            .predict(PredictionRequest {
                series,
                model: config.prediction_model,
                action: config.prediction_action,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use smartmon_collector::{MockClusterView, MockCollectionClient};
    use smartmon_config::SmartConfig;
    use smartmon_predict::RecordingPredictor;
    use smartmon_store::MemObjectStore;
    use smartmon_types::{DeviceKey, Reading, SmartError};
    use std::collections::BTreeMap;

    struct Fixture {
        service: SmartService,
        client: Arc<MockCollectionClient>,
        cluster: Arc<MockClusterView>,
        predictor: Arc<RecordingPredictor>,
        _scheduler: Scheduler,
    }

    fn fixture(config: SmartConfig) -> Fixture {
        let client = MockCollectionClient::new().into_arc();
        let cluster = MockClusterView::new().into_arc();
        let predictor = RecordingPredictor::new().into_arc();
        let backend: Arc<dyn ObjectStore> =
            Arc::new(MemObjectStore::new(config.pool_name.clone()));

        let (service, scheduler) = SmartService::build(
            Arc::new(ConfigHandle::new(config)),
            backend,
            client.clone(),
            cluster.clone(),
            predictor.clone(),
        );
        Fixture {
            service,
            client,
            cluster,
            predictor,
            _scheduler: scheduler,
        }
    }

    fn smart_report(devices: &[&str]) -> BTreeMap<DeviceKey, Reading> {
        devices
            .iter()
            .map(|d| {
                (
                    DeviceKey::from(*d),
                    Reading::new(json!({"device": *d, "smart_status": {"passed": true}})),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_status_and_toggle() {
        let f = fixture(SmartConfig::default());
        assert!(!f.service.status().active);
        f.service.enable();
        assert!(f.service.status().active);
        f.service.disable();
        assert!(!f.service.status().active);
    }

    #[tokio::test]
    async fn test_end_to_end_scrape_and_dump_all() {
        // Schedule config as an operator would set it; the scrape here is
        // the on-demand path.
        let f = fixture(SmartConfig {
            begin_time: "0200".into(),
            scrape_frequency: 86_400,
            ..Default::default()
        });
        let node = NodeId::from("osd1");
        f.cluster.add_node(node.clone(), "osd1-host");
        f.client.set_readings(node.clone(), smart_report(&["sda", "sdb"]));

        let summary = f.service.scrape(&node).await.unwrap();
        assert_eq!(summary.devices_written, 2);

        let fleet = f.service.dump_all().await.unwrap();
        assert!(fleet.errors.is_empty());
        let keys: Vec<&str> = fleet.series.keys().map(|s| s.as_str()).collect();
        assert_eq!(keys, vec!["osd1-host:sda", "osd1-host:sdb"]);
        for doc in fleet.series.values() {
            assert_eq!(doc.as_object().unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_scrape_all_uses_fleet_membership() {
        let f = fixture(SmartConfig::default());
        for (id, host) in [("osd.0", "host-0"), ("osd.1", "host-1")] {
            let node = NodeId::from(id);
            f.cluster.add_node(node.clone(), host);
            f.client.set_readings(node, smart_report(&["sda"]));
        }

        let summary = f.service.scrape_all().await.unwrap();
        assert_eq!(summary.outcomes.len(), 2);
        assert_eq!(summary.nodes_succeeded(), 2);
    }

    #[tokio::test]
    async fn test_dump_single_series() {
        let f = fixture(SmartConfig::default());
        let node = NodeId::from("osd.0");
        f.cluster.add_node(node.clone(), "h");
        f.client.set_readings(node.clone(), smart_report(&["sda"]));
        f.service.scrape(&node).await.unwrap();

        let doc = f.service.dump(&SeriesName::from_raw("h:sda")).await.unwrap();
        assert_eq!(doc.as_object().unwrap().len(), 1);

        // Unknown series dumps empty, not an error.
        let doc = f.service.dump(&SeriesName::from_raw("h:ghost")).await.unwrap();
        assert!(doc.as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_on_demand_prediction() {
        let f = fixture(SmartConfig {
            prediction_model: "trivial".into(),
            prediction_action: "warn".into(),
            ..Default::default()
        });
        let node = NodeId::from("osd.0");
        f.cluster.add_node(node.clone(), "h");
        f.client.set_readings(node.clone(), smart_report(&["sda"]));
        f.service.scrape(&node).await.unwrap();

        f.service.predict_failure().await.unwrap();
        let calls = f.predictor.take_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, "trivial");
        assert_eq!(calls[0].series, vec![SeriesName::from_raw("h:sda")]);
    }

    #[tokio::test]
    async fn test_scrape_surfaces_fatal_errors_directly() {
        let f = fixture(SmartConfig::default());
        let node = NodeId::from("osd.7");
        // Known to the fleet, but the transport times out.
        f.cluster.add_node(node.clone(), "h7");
        f.client
            .set_error(node.clone(), SmartError::Timeout("osd.7".into()));

        let err = f.service.scrape(&node).await.unwrap_err();
        assert!(matches!(err, SmartError::Timeout(_)));
    }
}
