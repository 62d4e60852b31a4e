//! # Ledger-Todo Node Runtime
//!
//! Demo host for the workspace: an in-process ledger node plus one client
//! session driving it.
//!
//! ## Modular Structure
//!
//! - `container/` - Configuration and service wiring
//! - `runtime` - Background tasks and graceful shutdown
//! - `demo` - Scripted client scenario and JSON rendering
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, then `TD_*` environment overrides)
//! 2. Initialize tracing (`RUST_LOG`, else the configured level)
//! 3. Start the ledger node and the event log task
//! 4. Run the demo scenario and print the converged view
//! 5. Wait for Ctrl+C, then shut down

#![warn(missing_docs)]

pub mod container;
pub mod demo;
pub mod runtime;

pub use container::{ConfigError, NodeConfig, NodeContainer};
pub use runtime::NodeRuntime;
