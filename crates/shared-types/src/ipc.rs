//! # Wire Payloads
//!
//! The store's call encoding. Mutating calls travel as the `data` of a
//! transaction; reads travel as an encoded query. Both are bincode over
//! serde.
//!
//! ## Design Rules
//!
//! - Payloads MUST NOT contain a caller field; `TransactionRequest::from` is
//!   authoritative.
//! - A reverted transaction is still confirmed; its receipt carries the
//!   `TodoError` and no logs.

use crate::entities::{Address, Hash, Todo, TodoId};
use crate::errors::{CodecError, TodoError};
use crate::events::TodoEvent;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Serialize a payload with the wire codec.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    bincode::serialize(value).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Deserialize a payload with the wire codec.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    bincode::deserialize(bytes).map_err(|e| CodecError::Decode(e.to_string()))
}

// =============================================================================
// MUTATING CALLS
// =============================================================================

/// A mutating store call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoCall {
    /// `createTodo(content)`.
    CreateTodo {
        /// Initial content.
        content: String,
    },
    /// `updateTodo(id, content)`.
    UpdateTodo {
        /// Target record.
        id: TodoId,
        /// Replacement content.
        content: String,
    },
    /// `toggleTodo(id)`.
    ToggleTodo {
        /// Target record.
        id: TodoId,
    },
    /// `deleteTodo(id)`.
    DeleteTodo {
        /// Target record.
        id: TodoId,
    },
}

impl TodoCall {
    /// Method name, for logs.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::CreateTodo { .. } => "createTodo",
            Self::UpdateTodo { .. } => "updateTodo",
            Self::ToggleTodo { .. } => "toggleTodo",
            Self::DeleteTodo { .. } => "deleteTodo",
        }
    }

    /// The targeted record, if the call names one.
    #[must_use]
    pub fn target(&self) -> Option<TodoId> {
        match self {
            Self::CreateTodo { .. } => None,
            Self::UpdateTodo { id, .. } | Self::ToggleTodo { id } | Self::DeleteTodo { id } => {
                Some(*id)
            }
        }
    }

    /// Encode as transaction data.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        encode(self)
    }

    /// Decode from transaction data.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        decode(bytes)
    }
}

// =============================================================================
// READS
// =============================================================================

/// A read-only store query. Reads are public: any caller may read any record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoQuery {
    /// `getTodo(id)`.
    GetTodo {
        /// Record to fetch.
        id: TodoId,
    },
    /// `getUserTodos(owner)`.
    GetUserTodos {
        /// Owner whose records to list.
        owner: Address,
    },
}

impl TodoQuery {
    /// Encode for `read_state`.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        encode(self)
    }

    /// Decode a query.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        decode(bytes)
    }
}

/// Successful query result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryResponse {
    /// Result of `GetTodo`.
    Todo(Todo),
    /// Result of `GetUserTodos`, in creation order.
    Todos(Vec<Todo>),
}

/// What `read_state` returns once decoded: a value or the store's fault.
pub type QueryResult = Result<QueryResponse, TodoError>;

// =============================================================================
// TRANSACTIONS
// =============================================================================

/// A transaction as handed to the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Signing identity; the caller for the store call.
    pub from: Address,
    /// Encoded `TodoCall`.
    pub data: Vec<u8>,
}

impl TransactionRequest {
    /// Build a request by encoding `call`.
    pub fn new(from: Address, call: &TodoCall) -> Result<Self, CodecError> {
        Ok(Self {
            from,
            data: call.encode()?,
        })
    }
}

/// Outcome of an applied transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    /// State changed; notifications were emitted.
    Success,
    /// The store rejected the call; nothing changed.
    Reverted(TodoError),
}

/// Confirmation that a transaction was applied by the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Transaction hash.
    pub tx_hash: Hash,
    /// Block that includes the transaction.
    pub block_number: u64,
    /// Sender.
    pub from: Address,
    /// Sender nonce assigned at submission.
    pub nonce: u64,
    /// Applied or reverted.
    pub status: ReceiptStatus,
    /// Notifications emitted, in order. Empty when reverted.
    pub logs: Vec<TodoEvent>,
}

impl TransactionReceipt {
    /// Returns true if the call applied.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.status, ReceiptStatus::Success)
    }

    /// The id announced by a `Created` log, if any.
    #[must_use]
    pub fn created_id(&self) -> Option<TodoId> {
        self.logs.iter().find_map(|log| match log {
            TodoEvent::Created { id, .. } => Some(*id),
            _ => None,
        })
    }
}
