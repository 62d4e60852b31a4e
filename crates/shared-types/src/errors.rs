//! # Error Types
//!
//! The deterministic fault taxonomy raised by the record store, and codec
//! errors for the wire format.

use crate::entities::{Address, TodoId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Faults raised by the record store.
///
/// All three are deterministic and attributable to the caller: re-submitting
/// the same call against the same state fails the same way, so they are never
/// retried. Display strings are the ledger's revert reasons.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TodoError {
    /// Content was empty.
    #[error("Content cannot be empty")]
    InvalidInput,

    /// No record with this id exists (never created, or deleted).
    #[error("Todo does not exist")]
    NotFound {
        /// The id that was looked up.
        id: TodoId,
    },

    /// The caller does not own the record.
    #[error("Not the owner")]
    Unauthorized {
        /// The record that was targeted.
        id: TodoId,
        /// The identity that attempted the mutation.
        caller: Address,
    },
}

impl TodoError {
    /// Stable name of the fault kind, for logs and presentation.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput => "InvalidInput",
            Self::NotFound { .. } => "NotFound",
            Self::Unauthorized { .. } => "Unauthorized",
        }
    }
}

/// Errors encoding or decoding wire payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Serialization failed.
    #[error("encode failed: {0}")]
    Encode(String),

    /// Bytes did not decode into the expected type.
    #[error("decode failed: {0}")]
    Decode(String),
}
