//! Cross-crate integration tests.

pub mod convergence;
pub mod flows;
pub mod journal;

use shared_bus::InMemoryEventBus;
use std::sync::Arc;
use td_01_record_store::{LedgerConfig, LedgerNode, SystemClock};
use td_02_record_accessor::{AccessorConfig, InProcessLedger, RecordAccessor};

/// A running node with an accessor over it.
pub struct Harness {
    /// The ledger node.
    pub node: Arc<LedgerNode>,
    /// Accessor sharing the node.
    pub accessor: Arc<RecordAccessor<InProcessLedger>>,
}

impl Harness {
    /// Start a node with default configuration.
    pub fn start() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    /// Start a node with `config`.
    pub fn with_config(config: LedgerConfig) -> Self {
        let bus = Arc::new(InMemoryEventBus::new());
        let node = LedgerNode::start(config, bus, Arc::new(SystemClock));
        let accessor = Arc::new(RecordAccessor::new(
            Arc::new(InProcessLedger::new(Arc::clone(&node))),
            AccessorConfig::default(),
        ));
        Self { node, accessor }
    }
}
