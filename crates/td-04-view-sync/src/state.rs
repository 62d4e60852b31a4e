//! # View State

use crate::errors::SyncError;
use shared_types::{Address, Todo};

/// Synchronization status shown alongside the records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SyncStatus {
    /// Nothing in flight.
    #[default]
    Idle,
    /// A refresh or submit is running.
    Loading,
    /// The last operation failed.
    Error(SyncError),
}

/// The materialized view for one identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoView {
    /// Connected identity; `None` when disconnected.
    pub identity: Option<Address>,
    /// The identity's records in creation order, as of the last refresh.
    pub todos: Vec<Todo>,
    /// Status of the most recent operation.
    pub status: SyncStatus,
}

impl TodoView {
    /// Empty view for a freshly connected identity.
    #[must_use]
    pub fn connected(identity: Address) -> Self {
        Self {
            identity: Some(identity),
            ..Self::default()
        }
    }

    /// Returns true while an operation is running.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.status, SyncStatus::Loading)
    }

    /// The error being shown, if any.
    #[must_use]
    pub fn error(&self) -> Option<&SyncError> {
        match &self.status {
            SyncStatus::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Number of completed records.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.is_completed).count()
    }
}
