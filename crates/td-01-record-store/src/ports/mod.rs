//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions for the record store.
//!
//! - **Driving Port (Inbound)**: `RecordStoreApi`
//! - **Driven Port (Outbound)**: `Clock`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
