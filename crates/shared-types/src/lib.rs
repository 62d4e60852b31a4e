//! # Shared Types Crate
//!
//! Types that cross the boundary between the ledger-resident record store and
//! the client synchronization core.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: records, notifications, faults and the wire
//!   codec are defined once, here.
//! - **Faults are data**: `TodoError` is serializable so a reverted
//!   transaction's receipt carries the exact fault kind back to the caller.
//! - **Identity lives outside payloads**: calls never carry a caller field;
//!   the transaction's `from` is the sole authority.

pub mod entities;
pub mod errors;
pub mod events;
pub mod ipc;

pub use entities::*;
pub use errors::*;
pub use events::*;
pub use ipc::*;
