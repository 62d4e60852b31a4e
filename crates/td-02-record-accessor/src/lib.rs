//! # TD-02 Record Accessor - Typed Ledger Facade
//!
//! **Subsystem ID:** 2
//! **Status:** Production-Ready
//!
//! ## Purpose
//!
//! Maps each store operation onto the ledger's generic interface: encodes
//! the call, submits it, waits for confirmation and decodes the outcome.
//! Store faults come back unchanged as `AccessorError::Fault`; everything
//! that went wrong on the way is `AccessorError::Transport`.
//!
//! Holds no state besides the client handle and its configuration.
//!
//! ## Operations
//!
//! | Method | Ledger Path | Result |
//! |--------|-------------|--------|
//! | `create_todo` | submit + confirm | new `TodoId` |
//! | `update_todo` | submit + confirm | `()` |
//! | `toggle_todo` | submit + confirm | `()` |
//! | `delete_todo` | submit + confirm | `()` |
//! | `get_todo` | read | `Todo` |
//! | `get_user_todos` | read | `Vec<Todo>` in creation order |
//!
//! ## Outbound Dependencies
//!
//! | Dependency | Trait | Purpose |
//! |------------|-------|---------|
//! | Ledger | `LedgerClient` | submit, confirm, read, subscribe |
//!
//! ## Usage Example
//!
//! ```ignore
//! use td_02_record_accessor::prelude::*;
//!
//! let accessor = RecordAccessor::new(Arc::new(InProcessLedger::new(node)), AccessorConfig::default());
//! let id = accessor.create_todo(alice, "buy milk").await?;
//! let todos = accessor.get_user_todos(alice).await?;
//! ```

#![warn(missing_docs)]

pub mod adapters;
pub mod errors;
pub mod ports;
pub mod service;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::adapters::InProcessLedger;
    pub use crate::errors::{AccessorError, TransportError};
    pub use crate::ports::LedgerClient;
    pub use crate::service::{AccessorConfig, RecordAccessor};
}

pub use prelude::*;

/// Subsystem identifier.
pub const SUBSYSTEM_ID: u8 = 2;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Record Accessor";
