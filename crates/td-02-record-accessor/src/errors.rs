//! # Error Types
//!
//! Two families that are never conflated: deterministic store faults, which
//! are final, and transport faults, which a caller may retry.

use shared_types::{CodecError, Hash, TodoError};
use thiserror::Error;

/// Failures between the client and the ledger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The ledger refused to queue the transaction.
    #[error("submission rejected: {0}")]
    SubmissionRejected(String),

    /// No receipt within the wait.
    #[error("confirmation of 0x{} timed out after {waited_ms} ms", hex::encode(.tx_hash))]
    ConfirmationTimeout {
        /// Transaction waited on.
        tx_hash: Hash,
        /// How long the wait lasted.
        waited_ms: u64,
    },

    /// The ledger has no record of the transaction.
    #[error("unknown transaction 0x{}", hex::encode(.tx_hash))]
    UnknownTransaction {
        /// Hash that was looked up.
        tx_hash: Hash,
    },

    /// The ledger is unreachable or stopped.
    #[error("ledger disconnected")]
    Disconnected,

    /// A payload could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),
}

impl From<CodecError> for TransportError {
    fn from(err: CodecError) -> Self {
        Self::Codec(err.to_string())
    }
}

/// Result of any accessor operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessorError {
    /// The store rejected the call.
    #[error("{0}")]
    Fault(#[from] TodoError),

    /// The call did not complete.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl AccessorError {
    /// Transport failures may succeed on retry; store faults never do.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// The store fault, if this is one.
    #[must_use]
    pub fn fault(&self) -> Option<&TodoError> {
        match self {
            Self::Fault(fault) => Some(fault),
            Self::Transport(_) => None,
        }
    }
}

impl From<CodecError> for AccessorError {
    fn from(err: CodecError) -> Self {
        Self::Transport(err.into())
    }
}
