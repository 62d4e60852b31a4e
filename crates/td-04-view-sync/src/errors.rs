//! # Error Types

use shared_types::TodoError;
use td_02_record_accessor::{AccessorError, TransportError};
use td_03_change_listener::ListenerError;
use thiserror::Error;

/// Errors surfaced by the view synchronizer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The store rejected the operation. Final.
    #[error("{0}")]
    Fault(TodoError),

    /// The operation did not reach a result. May be retried.
    #[error(transparent)]
    Transport(TransportError),

    /// No identity is connected.
    #[error("no identity connected")]
    NotConnected,
}

impl SyncError {
    /// True only for transport failures.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<AccessorError> for SyncError {
    fn from(err: AccessorError) -> Self {
        match err {
            AccessorError::Fault(fault) => Self::Fault(fault),
            AccessorError::Transport(transport) => Self::Transport(transport),
        }
    }
}

/// Errors from session wiring.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Subscriptions could not be established.
    #[error("listener: {0}")]
    Listener(#[from] ListenerError),

    /// The initial refresh failed.
    #[error("sync: {0}")]
    Sync(#[from] SyncError),
}
