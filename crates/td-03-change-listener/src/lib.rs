//! # TD-03 Change Listener - Notification Subscriptions
//!
//! **Subsystem ID:** 3
//! **Status:** Production-Ready
//!
//! ## Purpose
//!
//! Turns ledger notifications into refresh triggers for one identity at a
//! time. Notifications are hints: nothing here reads their payload beyond
//! the subscription filter, because the view is always rebuilt by a full
//! re-fetch.
//!
//! ## Subscriptions per Identity
//!
//! | Kind | Filter | Reason |
//! |------|--------|--------|
//! | `TodoCreated` | owner = identity | Only the identity's own records enter its view |
//! | `TodoUpdated` | none | Notification carries no owner |
//! | `TodoToggled` | none | Notification carries no owner |
//! | `TodoDeleted` | none | Notification carries no owner |
//!
//! ## Guarantees
//!
//! - No replay: a subscription sees only notifications emitted after it was
//!   created.
//! - Triggers that arrive before the pending refresh ran coalesce into one.
//! - Triggers stamped with a superseded identity's generation are dropped.
//! - A subscription that closes is reported on `ListenerErrors`, never
//!   swallowed.

#![warn(missing_docs)]

pub mod errors;
pub mod listener;
pub mod signal;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::errors::ListenerError;
    pub use crate::listener::{ChangeListener, ListenerErrors};
    pub use crate::signal::RefreshSignal;
}

pub use prelude::*;

/// Subsystem identifier.
pub const SUBSYSTEM_ID: u8 = 3;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Change Listener";
