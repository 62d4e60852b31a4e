//! # Intents
//!
//! What the presentation layer asks for. An intent names no caller; the
//! synchronizer's connected identity signs it.

use shared_types::{TodoCall, TodoId};

/// A requested mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoIntent {
    /// Add a record.
    Create {
        /// Content as entered.
        content: String,
    },
    /// Replace a record's content.
    Edit {
        /// Target.
        id: TodoId,
        /// New content as entered.
        content: String,
    },
    /// Flip completion.
    Toggle {
        /// Target.
        id: TodoId,
    },
    /// Remove a record.
    Delete {
        /// Target.
        id: TodoId,
    },
}

impl TodoIntent {
    /// Content carried by the intent, if any.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Create { content } | Self::Edit { content, .. } => Some(content),
            Self::Toggle { .. } | Self::Delete { .. } => None,
        }
    }

    /// Store call for this intent. Content is sent as entered.
    #[must_use]
    pub fn to_call(&self) -> TodoCall {
        match self {
            Self::Create { content } => TodoCall::CreateTodo {
                content: content.clone(),
            },
            Self::Edit { id, content } => TodoCall::UpdateTodo {
                id: *id,
                content: content.clone(),
            },
            Self::Toggle { id } => TodoCall::ToggleTodo { id: *id },
            Self::Delete { id } => TodoCall::DeleteTodo { id: *id },
        }
    }
}
