//! The long-lived scrape scheduling loop.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;

use smartmon_collector::{ClusterView, ScrapeOrchestrator};
use smartmon_config::{ConfigHandle, SmartConfig};
use smartmon_predict::{FailurePredictor, PredictionRequest};
use smartmon_query::QueryEngine;
use smartmon_types::Result;

/// Control messages for the scheduler loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerControl {
    /// Configuration changed: recompute the next run without scraping now.
    Wake,
    /// Stop the loop. Also unblocks a pending sleep promptly.
    Shutdown,
}

/// Cloneable handle for signalling the scheduler from operator commands.
#[derive(Clone)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<SchedulerControl>,
}

impl SchedulerHandle {
    /// Raise the wake signal. Raising it while already raised is a no-op
    /// (a full channel just means a recompute is already pending).
    pub fn wake(&self) {
        let _ = self.tx.try_send(SchedulerControl::Wake);
    }

    /// Request shutdown.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(SchedulerControl::Shutdown).await;
    }
}

/// The scheduling loop: sleep until the next anchored run instant, or until
/// woken, then run one scrape-and-predict cycle if scraping is active.
///
/// All schedule state is owned by this task; operator commands reach it only
/// through the shared [`ConfigHandle`] and the control channel, so there is
/// no shared mutable scheduling state to race on. Configuration is re-read
/// at the top of every iteration, and `active` is re-read again on the
/// sleep-to-run transition, so a change made during a sleep that was cut
/// short is always observed before the next scrape.
pub struct Scheduler {
    config: Arc<ConfigHandle>,
    orchestrator: ScrapeOrchestrator,
    cluster: Arc<dyn ClusterView>,
    query: QueryEngine,
    predictor: Arc<dyn FailurePredictor>,
    rx: mpsc::Receiver<SchedulerControl>,
}

impl Scheduler {
    pub fn new(
        config: Arc<ConfigHandle>,
        orchestrator: ScrapeOrchestrator,
        cluster: Arc<dyn ClusterView>,
        query: QueryEngine,
        predictor: Arc<dyn FailurePredictor>,
    ) -> (Self, SchedulerHandle) {
        let (tx, rx) = mpsc::channel(4);
        (
            Self {
                config,
                orchestrator,
                cluster,
                query,
                predictor,
                rx,
            },
            SchedulerHandle { tx },
        )
    }

    /// Run until shutdown. A failed cycle is logged and the loop continues;
    /// only an explicit shutdown (or every handle being dropped) stops it.
    pub async fn run(mut self) {
        tracing::info!("Scheduler started");
        loop {
            let config = self.config.snapshot();
            let spec = crate::ScheduleSpec::from_config(&config);
            let sleep = spec.sleep_from(Utc::now());
            tracing::debug!(
                sleep_secs = sleep.as_secs(),
                active = config.active,
                "Scheduler sleeping"
            );

            let due = tokio::select! {
                _ = tokio::time::sleep(sleep) => true,
                msg = self.rx.recv() => match msg {
                    Some(SchedulerControl::Wake) => {
                        tracing::debug!("Woken to re-read configuration");
                        false
                    }
                    Some(SchedulerControl::Shutdown) | None => {
                        tracing::info!("Scheduler stopped");
                        return;
                    }
                },
            };

            if due {
                // Re-read: active may have flipped while we slept.
                let config = self.config.snapshot();
                if config.active {
                    if let Err(e) = self.run_cycle(&config).await {
                        tracing::warn!(error = %e, "Scrape cycle failed");
                    }
                } else {
                    tracing::debug!("Schedule fired while inactive, skipping scrape");
                }
            }
        }
    }

    /// One scrape-and-predict cycle over the full current fleet.
    async fn run_cycle(&self, config: &SmartConfig) -> Result<()> {
        let nodes = self.cluster.nodes().await?;
        let summary = self.orchestrator.scrape_all(&nodes).await;
        tracing::info!(
            succeeded = summary.nodes_succeeded(),
            failed = summary.nodes_failed(),
            "Scheduled scrape cycle finished"
        );

        // Once per cycle, over the full current set of series.
        let series = self.query.series_names().await?;
        self.predictor
            .predict(PredictionRequest {
                series,
                model: config.prediction_model.clone(),
                action: config.prediction_action.clone(),
            })
            .await
    }
}
