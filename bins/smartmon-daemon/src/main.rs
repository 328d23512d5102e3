use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use smartmon_collector::{ClusterView, CollectionClient, MockClusterView, MockCollectionClient};
use smartmon_config::{ConfigHandle, SmartConfig};
use smartmon_logging::LogConfig;
use smartmon_predict::{FailurePredictor, TrivialPredictor};
use smartmon_service::SmartService;
use smartmon_store::{MemObjectStore, ObjectStore};

/// SMART telemetry collection daemon
#[derive(Parser, Debug)]
#[command(name = "smartmon-daemon", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "smartmon.toml")]
    config: String,

    /// Directory for rolling daily log files
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Emit JSON-formatted log events
    #[arg(long)]
    json_log: bool,

    /// Dump default configuration and exit
    #[arg(long)]
    dump_default_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.dump_default_config {
        print!("{}", toml::to_string_pretty(&SmartConfig::default())?);
        return Ok(());
    }

    let _log_guard = smartmon_logging::init_logging(&LogConfig {
        log_dir: args.log_dir.clone(),
        json_format: args.json_log,
        ..Default::default()
    });

    let config = if std::path::Path::new(&args.config).exists() {
        Arc::new(ConfigHandle::load(&args.config)?)
    } else {
        tracing::info!(config = %args.config, "No configuration file, using defaults");
        Arc::new(ConfigHandle::default())
    };
    let pool = config.snapshot().pool_name;
    tracing::info!(config = %args.config, pool = %pool, "Starting smartmon daemon");

    // In-process substrate and collaborators; real cluster transports plug in
    // behind the same traits.
    let backend: Arc<dyn ObjectStore> = Arc::new(MemObjectStore::new(pool));
    let client: Arc<dyn CollectionClient> = MockCollectionClient::new().into_arc();
    let cluster: Arc<dyn ClusterView> = MockClusterView::new().into_arc();
    let predictor: Arc<dyn FailurePredictor> = Arc::new(TrivialPredictor);

    let (service, scheduler) = SmartService::build(config, backend, client, cluster, predictor);
    let handle = service.scheduler_handle();
    let scheduler_task = tokio::spawn(scheduler.run());

    tracing::info!(active = service.status().active, "Daemon initialization complete");
    wait_for_shutdown_signal().await;

    handle.shutdown().await;
    scheduler_task.await?;
    tracing::info!("Daemon shut down");

    Ok(())
}

/// Wait for a shutdown signal (CTRL+C or SIGTERM).
async fn wait_for_shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .expect("failed to register SIGTERM handler");
    tokio::select! {
        _ = ctrl_c => { tracing::info!("Received CTRL+C"); }
        _ = sigterm.recv() => { tracing::info!("Received SIGTERM"); }
    }
}
