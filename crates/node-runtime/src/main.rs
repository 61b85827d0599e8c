//! # Committee Node Runtime
//!
//! Entry point of the committee node.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults + `CN_*` environment)
//! 2. Build the service container (registry + dispatcher)
//! 3. Register committee inboxes and spawn their consumers
//! 4. If feed hosts are configured, spawn the dispatch service and connect
//!    the feed monitor that feeds it
//! 5. Wait for Ctrl+C, then shut everything down

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cn_02_dispatcher::DispatchService;
use node_runtime::{load_config, start_committees, FeedMonitor, NodeConfig, NodeContainer};

/// The node runtime owning every background task.
struct NodeRuntime {
    container: Arc<NodeContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl NodeRuntime {
    fn new(config: NodeConfig) -> Result<Self> {
        let container = NodeContainer::new(config).context("Invalid node configuration")?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Ok(Self {
            container: Arc::new(container),
            shutdown_tx,
            shutdown_rx,
            tasks: Vec::new(),
        })
    }

    async fn start(&mut self) -> Result<()> {
        info!("===========================================");
        info!("  Committee Node Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let container = Arc::clone(&self.container);
        let config = &container.config;

        for handle in start_committees(
            &container.registry,
            &config.committees.addresses,
            self.shutdown_rx.clone(),
        ) {
            self.tasks.push(tokio::spawn(async move {
                if let Err(e) = handle.await {
                    error!(error = %e, "Committee consumer failed");
                }
            }));
        }

        if config.feed.hosts.is_empty() {
            info!("No feed hosts configured, ledger dispatch disabled");
        } else {
            let (service, handle) = DispatchService::new(
                Arc::clone(&container.dispatcher),
                &config.dispatch,
                self.shutdown_rx.clone(),
            )
            .context("Failed to create dispatch service")?;
            self.tasks.push(tokio::spawn(async move {
                service.run().await;
            }));

            let monitor = FeedMonitor::connect(&config.feed, self.shutdown_rx.clone())
                .await
                .context("Failed to connect to publishers")?
                .with_dispatch(handle);
            self.tasks.push(tokio::spawn(async move {
                monitor.run().await;
            }));
        }

        info!(
            committees = container.registry.len(),
            "Committee node running"
        );
        Ok(())
    }

    /// Signal every task to stop and wait for them.
    async fn shutdown(mut self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!(error = %e, "Task ended abnormally");
            }
        }

        let stats = self.container.dispatcher.stats();
        info!(?stats, "Shutdown complete");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config();

    // RUST_LOG overrides the configured filter.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.filter))
        .context("Invalid log filter")?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut runtime = NodeRuntime::new(config)?;
    runtime.start().await?;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    runtime.shutdown().await;
    Ok(())
}
