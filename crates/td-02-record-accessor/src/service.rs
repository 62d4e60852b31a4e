//! # Record Accessor Service
//!
//! Typed operations over a `LedgerClient`. Each mutation is two halves,
//! `submit` and `confirm`, exposed separately so a caller can track the
//! pending transaction; the `*_todo` methods run both.

use crate::errors::{AccessorError, TransportError};
use crate::ports::LedgerClient;
use shared_types::{
    decode, Address, Hash, QueryResponse, QueryResult, ReceiptStatus, Todo, TodoCall, TodoId,
    TodoQuery, TransactionReceipt, TransactionRequest,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Accessor configuration.
#[derive(Debug, Clone)]
pub struct AccessorConfig {
    /// How long `confirm` waits for a receipt.
    pub confirmation_timeout: Duration,
}

impl Default for AccessorConfig {
    fn default() -> Self {
        Self {
            confirmation_timeout: Duration::from_secs(30),
        }
    }
}

/// Typed facade over the ledger interface.
pub struct RecordAccessor<C: LedgerClient> {
    client: Arc<C>,
    config: AccessorConfig,
}

impl<C: LedgerClient> RecordAccessor<C> {
    /// Create an accessor over `client`.
    pub fn new(client: Arc<C>, config: AccessorConfig) -> Self {
        Self { client, config }
    }

    /// The underlying client.
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Active configuration.
    pub fn config(&self) -> &AccessorConfig {
        &self.config
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Create a record owned by `from` and return its id.
    #[instrument(skip_all, fields(from = %from))]
    pub async fn create_todo(&self, from: Address, content: &str) -> Result<TodoId, AccessorError> {
        let call = TodoCall::CreateTodo {
            content: content.to_string(),
        };
        let receipt = self.execute(from, &call).await?;
        receipt.created_id().ok_or_else(|| {
            AccessorError::Transport(TransportError::Codec(
                "receipt carries no TodoCreated log".into(),
            ))
        })
    }

    /// Replace the content of `id`.
    #[instrument(skip_all, fields(from = %from, id = %id))]
    pub async fn update_todo(
        &self,
        from: Address,
        id: TodoId,
        content: &str,
    ) -> Result<(), AccessorError> {
        let call = TodoCall::UpdateTodo {
            id,
            content: content.to_string(),
        };
        self.execute(from, &call).await.map(|_| ())
    }

    /// Flip the completion flag of `id`.
    #[instrument(skip_all, fields(from = %from, id = %id))]
    pub async fn toggle_todo(&self, from: Address, id: TodoId) -> Result<(), AccessorError> {
        self.execute(from, &TodoCall::ToggleTodo { id })
            .await
            .map(|_| ())
    }

    /// Delete `id`.
    #[instrument(skip_all, fields(from = %from, id = %id))]
    pub async fn delete_todo(&self, from: Address, id: TodoId) -> Result<(), AccessorError> {
        self.execute(from, &TodoCall::DeleteTodo { id })
            .await
            .map(|_| ())
    }

    /// Submit and confirm any call.
    pub async fn execute(
        &self,
        from: Address,
        call: &TodoCall,
    ) -> Result<TransactionReceipt, AccessorError> {
        let tx_hash = self.submit(from, call).await?;
        self.confirm(tx_hash).await
    }

    /// First half of a mutation: encode and submit.
    pub async fn submit(&self, from: Address, call: &TodoCall) -> Result<Hash, AccessorError> {
        let request = TransactionRequest::new(from, call)?;
        let tx_hash = self.client.submit_transaction(request).await.map_err(|e| {
            warn!(method = call.method(), error = %e, "Submission failed");
            AccessorError::Transport(e)
        })?;
        debug!(method = call.method(), "Transaction submitted");
        Ok(tx_hash)
    }

    /// Second half of a mutation: wait for the receipt.
    ///
    /// A reverted receipt becomes `AccessorError::Fault` with the store's
    /// fault kind unchanged.
    pub async fn confirm(&self, tx_hash: Hash) -> Result<TransactionReceipt, AccessorError> {
        let receipt = self
            .client
            .wait_for_confirmation(tx_hash, self.config.confirmation_timeout)
            .await?;

        match &receipt.status {
            ReceiptStatus::Success => {
                debug!(block = receipt.block_number, "Transaction confirmed");
                Ok(receipt)
            }
            ReceiptStatus::Reverted(fault) => {
                debug!(block = receipt.block_number, fault = fault.kind(), "Transaction reverted");
                Err(AccessorError::Fault(fault.clone()))
            }
        }
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Fetch one record.
    pub async fn get_todo(&self, id: TodoId) -> Result<Todo, AccessorError> {
        match self.read(TodoQuery::GetTodo { id }).await? {
            QueryResponse::Todo(todo) => Ok(todo),
            QueryResponse::Todos(_) => Err(unexpected_response()),
        }
    }

    /// All records owned by `owner`, in creation order.
    pub async fn get_user_todos(&self, owner: Address) -> Result<Vec<Todo>, AccessorError> {
        match self.read(TodoQuery::GetUserTodos { owner }).await? {
            QueryResponse::Todos(todos) => Ok(todos),
            QueryResponse::Todo(_) => Err(unexpected_response()),
        }
    }

    async fn read(&self, query: TodoQuery) -> Result<QueryResponse, AccessorError> {
        let bytes = self.client.read_state(query.encode()?).await?;
        let result: QueryResult = decode(&bytes)?;
        Ok(result?)
    }
}

fn unexpected_response() -> AccessorError {
    AccessorError::Transport(TransportError::Codec(
        "response does not match query".into(),
    ))
}
