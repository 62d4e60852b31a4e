//! # Node Runtime
//!
//! Owns the container and the background tasks that run next to the ledger
//! writer. Every task watches the shared shutdown channel.

use crate::container::{NodeConfig, NodeContainer};
use crate::demo::event_json;
use shared_bus::{EventFilter, SubscriptionError};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{error, info};

/// The node runtime.
pub struct NodeRuntime {
    container: Arc<NodeContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl NodeRuntime {
    /// Create a runtime. The ledger writer starts immediately.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new(config: NodeConfig) -> Self {
        info!("Creating ledger-todo node runtime");
        let container = Arc::new(NodeContainer::new(config));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container,
            shutdown_tx,
            shutdown_rx,
            tasks: Vec::new(),
        }
    }

    /// Start the background tasks.
    pub fn start(&mut self) -> Result<(), SubscriptionError> {
        let mut events = self.container.bus.event_stream(EventFilter::all())?;
        let mut shutdown = self.shutdown_rx.clone();

        self.tasks.push(tokio::spawn(async move {
            loop {
                tokio::select! {
                    next = events.next() => match next {
                        Some(event) => info!(event = %event_json(&event), "Ledger event"),
                        None => {
                            info!("Event bus closed");
                            break;
                        }
                    },
                    _ = shutdown.changed() => {
                        info!("[event-log] Shutdown signal received");
                        break;
                    }
                }
            }
        }));

        info!(
            chain_id = self.container.node.chain_id(),
            "Node runtime started"
        );
        Ok(())
    }

    /// The container.
    pub fn container(&self) -> Arc<NodeContainer> {
        Arc::clone(&self.container)
    }

    /// Stop background tasks, then the ledger node.
    ///
    /// ## Shutdown Sequence
    ///
    /// 1. Signal shutdown to all tasks and wait for them
    /// 2. Stop the ledger writer and close the bus
    /// 3. Check the journal
    pub async fn shutdown(&mut self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                error!("Background task failed: {}", e);
            }
        }

        let node = &self.container.node;
        node.shutdown().await;
        match node.verify_journal() {
            Ok(()) => info!(height = node.block_number(), "Journal verified"),
            Err(e) => error!(error = %e, "Journal verification failed"),
        }

        let stats = node.stats();
        info!(
            applied = stats.transactions_applied,
            reverted = stats.transactions_reverted,
            rejected = stats.submissions_rejected,
            "Shutdown complete"
        );
    }
}
