//! # Record Notifications
//!
//! One-way signals emitted by the store after a successful mutation. They
//! carry just enough for a subscriber to decide whether to refresh:
//! `Created` names the owner and content, the other three only the id.

use crate::entities::{Address, TodoId};
use serde::{Deserialize, Serialize};

/// The four notification kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    /// A record was created.
    Created,
    /// A record's content was replaced.
    Updated,
    /// A record's completion flag was inverted.
    Toggled,
    /// A record was removed.
    Deleted,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 4] = [
        EventKind::Created,
        EventKind::Updated,
        EventKind::Toggled,
        EventKind::Deleted,
    ];

    /// Ledger event name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Created => "TodoCreated",
            Self::Updated => "TodoUpdated",
            Self::Toggled => "TodoToggled",
            Self::Deleted => "TodoDeleted",
        }
    }
}

/// A notification emitted by the record store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoEvent {
    /// `TodoCreated(id, owner, content)`.
    Created {
        /// New record id.
        id: TodoId,
        /// Creator.
        owner: Address,
        /// Initial content.
        content: String,
    },
    /// `TodoUpdated(id)`.
    Updated {
        /// Edited record.
        id: TodoId,
    },
    /// `TodoToggled(id)`.
    Toggled {
        /// Toggled record.
        id: TodoId,
    },
    /// `TodoDeleted(id)`.
    Deleted {
        /// Removed record.
        id: TodoId,
    },
}

impl TodoEvent {
    /// The notification kind.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Created { .. } => EventKind::Created,
            Self::Updated { .. } => EventKind::Updated,
            Self::Toggled { .. } => EventKind::Toggled,
            Self::Deleted { .. } => EventKind::Deleted,
        }
    }

    /// The record the notification is about.
    #[must_use]
    pub fn id(&self) -> TodoId {
        match self {
            Self::Created { id, .. }
            | Self::Updated { id }
            | Self::Toggled { id }
            | Self::Deleted { id } => *id,
        }
    }

    /// The owner, when the notification carries it (only `Created`).
    #[must_use]
    pub fn owner(&self) -> Option<Address> {
        match self {
            Self::Created { owner, .. } => Some(*owner),
            _ => None,
        }
    }

    /// The content, when the notification carries it (only `Created`).
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Created { content, .. } => Some(content),
            _ => None,
        }
    }
}
