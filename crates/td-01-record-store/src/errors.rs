//! # Error Types
//!
//! Errors raised by the ledger node itself. Store faults (`TodoError`) are
//! not errors at this level: a reverted call is a confirmed transaction whose
//! receipt carries the fault.

use shared_bus::SubscriptionError;
use shared_types::{CodecError, Hash};
use thiserror::Error;

/// Ledger node errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Transaction data is not a valid call.
    #[error("malformed call data: {0}")]
    MalformedCall(String),

    /// Query bytes are not a valid query.
    #[error("malformed query: {0}")]
    MalformedQuery(String),

    /// The writer queue is full.
    #[error("transaction queue full (capacity {capacity})")]
    QueueFull {
        /// Configured queue capacity.
        capacity: usize,
    },

    /// The node has shut down.
    #[error("ledger node stopped")]
    Stopped,

    /// No transaction with this hash was submitted.
    #[error("unknown transaction 0x{}", hex::encode(.tx_hash))]
    UnknownTransaction {
        /// Hash that was looked up.
        tx_hash: Hash,
    },

    /// The receipt did not appear in time.
    #[error("confirmation of 0x{} timed out after {waited_ms} ms", hex::encode(.tx_hash))]
    ConfirmationTimeout {
        /// Hash being waited on.
        tx_hash: Hash,
        /// How long the caller waited.
        waited_ms: u64,
    },

    /// Encoding a response failed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Bus subscription failed.
    #[error("subscription error: {0}")]
    Subscription(#[from] SubscriptionError),
}
