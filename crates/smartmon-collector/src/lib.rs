//! Collection of SMART readings from fleet nodes.
//!
//! [`CollectionClient`] and [`ClusterView`] are the external-facing seams:
//! the transport that asks a node for its current device readings, and the
//! membership/metadata collaborator that knows which nodes exist and what
//! their hostnames are. Mock implementations ship here for tests and for
//! running the daemon without a real cluster.
//!
//! [`ScrapeOrchestrator`] fans collection out across nodes and writes each
//! device's reading into the time-series store.

mod client;
mod cluster;
mod orchestrator;

pub use client::{CollectionClient, MockCollectionClient, NodeReadings};
pub use cluster::{ClusterView, MockClusterView};
pub use orchestrator::{FleetScrapeSummary, ScrapeOrchestrator, ScrapeSummary};
