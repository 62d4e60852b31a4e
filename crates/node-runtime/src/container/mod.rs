//! # Node Container
//!
//! Holds the ledger node and the client-side services built on top of it,
//! wired in dependency order:
//!
//! 1. Event bus
//! 2. Ledger node (writer task started)
//! 3. In-process ledger client
//! 4. Record accessor
//!
//! Sessions are created on demand from the shared accessor.

pub mod config;

pub use config::{ConfigError, NodeConfig};

use shared_bus::InMemoryEventBus;
use std::sync::Arc;
use td_01_record_store::{Clock, LedgerNode, SystemClock};
use td_02_record_accessor::{InProcessLedger, RecordAccessor};
use td_03_change_listener::ListenerErrors;
use td_04_view_sync::TodoSession;
use tracing::info;

/// Session type used by the runtime.
pub type Session = TodoSession<InProcessLedger>;

/// Services for one node.
pub struct NodeContainer {
    /// Active configuration.
    pub config: NodeConfig,
    /// Notification bus owned by the ledger node.
    pub bus: Arc<InMemoryEventBus>,
    /// The authoritative ledger.
    pub node: Arc<LedgerNode>,
    /// Typed access for clients.
    pub accessor: Arc<RecordAccessor<InProcessLedger>>,
}

impl NodeContainer {
    /// Build every service with the system clock.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new(config: NodeConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build every service with the given clock.
    pub fn with_clock(config: NodeConfig, clock: Arc<dyn Clock>) -> Self {
        let bus = Arc::new(InMemoryEventBus::with_capacity(config.bus.capacity));
        let node = LedgerNode::start(config.ledger_config(), Arc::clone(&bus), clock);
        let client = Arc::new(InProcessLedger::new(Arc::clone(&node)));
        let accessor = Arc::new(RecordAccessor::new(client, config.accessor_config()));

        info!(
            chain_id = config.ledger.chain_id,
            bus_capacity = config.bus.capacity,
            "Node container initialized"
        );

        Self {
            config,
            bus,
            node,
            accessor,
        }
    }

    /// A disconnected session sharing this node's accessor.
    pub fn session(&self) -> (Session, ListenerErrors) {
        TodoSession::new(Arc::clone(&self.accessor), self.config.sync_config())
    }
}
