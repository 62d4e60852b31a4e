//! # Domain Layer
//!
//! Pure record-keeping logic. No I/O, no async, no clock: timestamps are
//! passed in by the caller so every mutation is deterministic.

pub mod invariants;
pub mod journal;
pub mod store;

pub use invariants::{authorize, validate_content, InvariantViolation};
pub use journal::{Journal, JournalError, LedgerBlock};
pub use store::RecordStore;
