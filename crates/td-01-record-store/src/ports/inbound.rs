//! # Driving Ports (API - Inbound)
//!
//! The operation surface the ledger node exposes to clients. Calls are
//! opaque bytes here; typed encoding is the accessor's job.

use crate::errors::LedgerError;
use async_trait::async_trait;
use shared_bus::{EventFilter, Subscription};
use shared_types::{Hash, TransactionReceipt, TransactionRequest};
use std::time::Duration;

/// Primary API of the ledger node.
#[async_trait]
pub trait RecordStoreApi: Send + Sync {
    /// Queue a mutating call for the single writer.
    ///
    /// # Errors
    ///
    /// - `MalformedCall` - `data` does not decode into a call
    /// - `QueueFull` / `Stopped` - the node cannot accept work
    async fn submit_transaction(&self, request: TransactionRequest) -> Result<Hash, LedgerError>;

    /// Wait until the transaction is applied. A reverted call still
    /// confirms; its fault is in the receipt status.
    ///
    /// `None` uses the node's configured timeout.
    async fn wait_for_confirmation(
        &self,
        tx_hash: Hash,
        timeout: Option<Duration>,
    ) -> Result<TransactionReceipt, LedgerError>;

    /// Run an encoded `TodoQuery`; returns an encoded `QueryResult`.
    async fn read_state(&self, query: Vec<u8>) -> Result<Vec<u8>, LedgerError>;

    /// Subscribe to notifications published from now on.
    fn subscribe(&self, filter: EventFilter) -> Result<Subscription, LedgerError>;
}
