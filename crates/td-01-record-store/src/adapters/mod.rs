//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete implementations of the outbound ports.

pub mod clock;

pub use clock::{ManualClock, SystemClock};
