//! # Domain Invariants
//!
//! Checks that MUST hold for every record the store accepts, plus the
//! violation type reported by the full-state audit.

use shared_types::{Address, Todo, TodoError, TodoId};
use thiserror::Error;

// =============================================================================
// CALL-TIME CHECKS
// =============================================================================

/// INVARIANT-6: Content is never empty.
///
/// Only the exact empty string is rejected. Whitespace-only content is
/// accepted here; trimming is a client concern.
pub fn validate_content(content: &str) -> Result<(), TodoError> {
    if content.is_empty() {
        return Err(TodoError::InvalidInput);
    }
    Ok(())
}

/// INVARIANT-3: Only the owner mutates a record.
pub fn authorize(todo: &Todo, caller: &Address) -> Result<(), TodoError> {
    if !todo.is_owned_by(caller) {
        return Err(TodoError::Unauthorized {
            id: todo.id,
            caller: *caller,
        });
    }
    Ok(())
}

// =============================================================================
// STATE AUDIT
// =============================================================================

/// A broken invariant found by `RecordStore::check_invariants`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A record is missing from its owner's index entry.
    #[error("record {id} missing from owner index of {owner}")]
    MissingFromIndex {
        /// Record id.
        id: TodoId,
        /// Its owner.
        owner: Address,
    },

    /// An index entry names a record that does not exist or has another owner.
    #[error("owner index of {owner} lists {id}, which it does not own")]
    DanglingIndexEntry {
        /// Indexed id.
        id: TodoId,
        /// Index owner.
        owner: Address,
    },

    /// A record is stored under a key different from its own id.
    #[error("record {id} stored under key {key}")]
    KeyMismatch {
        /// Map key.
        key: TodoId,
        /// Record's own id.
        id: TodoId,
    },

    /// A record id is at or above the next id to be assigned.
    #[error("record {id} is not below next id {next}")]
    IdNotIssued {
        /// Record id.
        id: TodoId,
        /// Next id.
        next: TodoId,
    },

    /// `updated_at` precedes `created_at`.
    #[error("record {id} updated before it was created")]
    TimestampOrder {
        /// Record id.
        id: TodoId,
    },

    /// A stored record has empty content.
    #[error("record {id} has empty content")]
    EmptyContent {
        /// Record id.
        id: TodoId,
    },
}
