//! # Ledger-Todo Test Suite
//!
//! Cross-crate tests that need the ledger node and the client core
//! together.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs        # Accessor → store → receipt → notification
//!     ├── convergence.rs  # Listener + synchronizer against live writers
//!     └── journal.rs      # Hash chain over real traffic
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p td-tests
//! cargo test -p td-tests integration::convergence::
//! ```

#![allow(dead_code)]

pub mod integration;
