//! # Adapters Layer (Outer Hexagon)

pub mod in_process;

pub use in_process::InProcessLedger;
