//! # Error Types

use shared_types::{Address, EventKind};
use td_02_record_accessor::TransportError;
use thiserror::Error;

/// Change listener errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListenerError {
    /// An operation needs a watched identity and there is none.
    #[error("not watching any identity")]
    NotWatching,

    /// Some kinds could not be subscribed; the others are active.
    #[error("failed to subscribe to {kinds:?}: {error}")]
    SubscribeFailed {
        /// Kinds without an active subscription.
        kinds: Vec<EventKind>,
        /// The first failure.
        error: TransportError,
    },

    /// A live subscription ended. The kind stays silent until resubscribed.
    #[error("{} subscription for {identity} closed", .kind.name())]
    SubscriptionClosed {
        /// Kind whose subscription closed.
        kind: EventKind,
        /// Identity it was watching for.
        identity: Address,
    },
}
