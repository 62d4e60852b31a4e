//! # Driven Ports (SPI - Outbound)
//!
//! The one fixed interface to the ledger. Wallets, RPC transports and fee
//! handling live behind it; the core only ever sees these four operations.

use crate::errors::TransportError;
use async_trait::async_trait;
use shared_bus::{EventFilter, Subscription};
use shared_types::{Hash, TransactionReceipt, TransactionRequest};
use std::time::Duration;

/// Generic ledger interface.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Hand a signed transaction to the ledger.
    ///
    /// # Returns
    ///
    /// The transaction hash to wait on.
    async fn submit_transaction(&self, request: TransactionRequest)
        -> Result<Hash, TransportError>;

    /// Block until the transaction is applied or `timeout` elapses.
    ///
    /// A reverted transaction is still a confirmation; its fault is in the
    /// receipt status.
    async fn wait_for_confirmation(
        &self,
        tx_hash: Hash,
        timeout: Duration,
    ) -> Result<TransactionReceipt, TransportError>;

    /// Run an encoded query; returns the encoded result.
    async fn read_state(&self, query: Vec<u8>) -> Result<Vec<u8>, TransportError>;

    /// Subscribe to notifications emitted from now on.
    fn subscribe(&self, filter: EventFilter) -> Result<Subscription, TransportError>;
}
