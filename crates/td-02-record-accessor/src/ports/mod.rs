//! # Ports Layer (Middle Hexagon)
//!
//! - **Driven Port (Outbound)**: `LedgerClient`

pub mod outbound;

pub use outbound::*;
