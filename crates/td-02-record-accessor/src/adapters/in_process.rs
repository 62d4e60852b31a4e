//! # In-Process Ledger Adapter
//!
//! Implements `LedgerClient` directly on a `LedgerNode` running in the same
//! process. Used by the demo node and by tests.

use crate::errors::TransportError;
use crate::ports::LedgerClient;
use async_trait::async_trait;
use shared_bus::{EventFilter, Subscription};
use shared_types::{Hash, TransactionReceipt, TransactionRequest};
use std::sync::Arc;
use std::time::Duration;
use td_01_record_store::{LedgerError, LedgerNode, RecordStoreApi};

impl From<LedgerError> for TransportError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::MalformedCall(_) | LedgerError::QueueFull { .. } => {
                Self::SubmissionRejected(err.to_string())
            }
            LedgerError::MalformedQuery(reason) => Self::Codec(reason),
            LedgerError::Codec(e) => Self::Codec(e.to_string()),
            LedgerError::UnknownTransaction { tx_hash } => Self::UnknownTransaction { tx_hash },
            LedgerError::ConfirmationTimeout { tx_hash, waited_ms } => {
                Self::ConfirmationTimeout { tx_hash, waited_ms }
            }
            LedgerError::Stopped | LedgerError::Subscription(_) => Self::Disconnected,
        }
    }
}

/// `LedgerClient` over an in-process node.
#[derive(Clone)]
pub struct InProcessLedger {
    node: Arc<LedgerNode>,
}

impl InProcessLedger {
    /// Wrap a running node.
    #[must_use]
    pub fn new(node: Arc<LedgerNode>) -> Self {
        Self { node }
    }

    /// The wrapped node.
    #[must_use]
    pub fn node(&self) -> &Arc<LedgerNode> {
        &self.node
    }
}

#[async_trait]
impl LedgerClient for InProcessLedger {
    async fn submit_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<Hash, TransportError> {
        Ok(self.node.submit_transaction(request).await?)
    }

    async fn wait_for_confirmation(
        &self,
        tx_hash: Hash,
        timeout: Duration,
    ) -> Result<TransactionReceipt, TransportError> {
        Ok(RecordStoreApi::wait_for_confirmation(&*self.node, tx_hash, Some(timeout)).await?)
    }

    async fn read_state(&self, query: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        Ok(self.node.read_state(query).await?)
    }

    fn subscribe(&self, filter: EventFilter) -> Result<Subscription, TransportError> {
        Ok(RecordStoreApi::subscribe(&*self.node, filter)?)
    }
}
