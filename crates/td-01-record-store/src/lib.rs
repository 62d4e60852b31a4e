//! # TD-01 Record Store - Ledger-Resident Task Records
//!
//! **Subsystem ID:** 1
//! **Status:** Production-Ready
//!
//! ## Purpose
//!
//! Holds every task record, enforces per-owner write access, and emits one
//! notification per successful mutation. Mutations arrive as transactions on
//! a single-writer queue, so they are applied in a total order; reads are
//! public and served from the current state.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Ids are unique and never reused | `domain/store.rs` - `RecordStore::create()` |
//! | INVARIANT-2 | Owner never changes | `domain/store.rs` - no setter exists |
//! | INVARIANT-3 | Only the owner mutates a record | `domain/invariants.rs` - `authorize()` |
//! | INVARIANT-4 | Owner index matches the record map | `domain/store.rs` - `check_invariants()` |
//! | INVARIANT-5 | `created_at <= updated_at` | `domain/store.rs` - `check_invariants()` |
//! | INVARIANT-6 | Content is never empty | `domain/invariants.rs` - `validate_content()` |
//! | INVARIANT-7 | Journal hash chain is intact | `domain/journal.rs` - `Journal::verify()` |
//!
//! ## Operations
//!
//! | Call | Fault Order | Notification |
//! |------|-------------|--------------|
//! | `createTodo(content)` | InvalidInput | `TodoCreated(id, owner, content)` |
//! | `updateTodo(id, content)` | NotFound, Unauthorized, InvalidInput | `TodoUpdated(id)` |
//! | `toggleTodo(id)` | NotFound, Unauthorized | `TodoToggled(id)` |
//! | `deleteTodo(id)` | NotFound, Unauthorized | `TodoDeleted(id)` |
//! | `getTodo(id)` | NotFound | - |
//! | `getUserTodos(owner)` | - | - |
//!
//! ## Outbound Dependencies
//!
//! | Dependency | Trait | Purpose |
//! |------------|-------|---------|
//! | Wall clock | `Clock` | Block timestamps |
//! | Event bus | `EventPublisher` | Notification delivery |
//!
//! ## Usage Example
//!
//! ```ignore
//! use td_01_record_store::prelude::*;
//!
//! let node = LedgerNode::start(LedgerConfig::default(), bus, Arc::new(SystemClock));
//! let tx_hash = node.submit(TransactionRequest::new(alice, &call)?)?;
//! let receipt = node.wait_for_confirmation(tx_hash, None).await?;
//! ```

#![warn(missing_docs)]

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::adapters::{ManualClock, SystemClock};
    pub use crate::domain::{InvariantViolation, Journal, JournalError, LedgerBlock, RecordStore};
    pub use crate::errors::LedgerError;
    pub use crate::ports::{Clock, RecordStoreApi};
    pub use crate::service::{LedgerConfig, LedgerNode, LedgerStats};
}

pub use prelude::*;

/// Subsystem identifier.
pub const SUBSYSTEM_ID: u8 = 1;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Record Store";

/// Chain id of a local development ledger.
pub const DEFAULT_CHAIN_ID: u64 = 31337;
