//! # TD-04 View Synchronizer - Per-Identity Materialized View
//!
//! **Subsystem ID:** 4
//! **Status:** Production-Ready
//!
//! ## Purpose
//!
//! Keeps a local copy of one identity's records in step with the ledger.
//! The copy is only ever replaced wholesale by a full re-fetch; mutations
//! are forwarded and confirmed but never applied locally, so the view shows
//! confirmed ledger state and nothing else.
//!
//! ## Flow
//!
//! ```text
//! intent ──submit──► Accessor ──► ledger ──notification──► Listener
//!                                                              │
//!   view ◄──replace── refresh ◄──── refresh loop ◄──signal─────┘
//! ```
//!
//! ## Status Rules
//!
//! | Event | Status |
//! |-------|--------|
//! | Operation starts | `Loading`, unless an error is showing |
//! | Operation succeeds | `Idle` once no other operation is running, else `Loading` (clears any error) |
//! | Listener fails to subscribe on connect | `Error(e)` after the backfill |
//! | Operation fails | `Error(e)`; view contents untouched |
//! | Identity change | `Idle`, empty view; older in-flight results ignored |

#![warn(missing_docs)]

pub mod config;
pub mod errors;
pub mod intent;
pub mod session;
pub mod state;
pub mod synchronizer;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::SyncConfig;
    pub use crate::errors::{SessionError, SyncError};
    pub use crate::intent::TodoIntent;
    pub use crate::session::TodoSession;
    pub use crate::state::{SyncStatus, TodoView};
    pub use crate::synchronizer::ViewSynchronizer;
}

pub use prelude::*;

/// Subsystem identifier.
pub const SUBSYSTEM_ID: u8 = 4;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "View Synchronizer";
