//! # Bus Events and Filters
//!
//! The bus carries the store's `TodoEvent` notifications unchanged. Filters
//! select by kind and, for events that name an owner, by owner.

pub use shared_types::events::{EventKind, TodoEvent};
use shared_types::Address;

/// Subscription filter.
///
/// An event matches when its kind is listed and, if `owner` is set, the event
/// names that owner. Events that do not carry an owner (`Updated`, `Toggled`,
/// `Deleted`) never match an owner-scoped filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    /// Accepted kinds. Empty means all kinds.
    pub kinds: Vec<EventKind>,
    /// Required owner, if any.
    pub owner: Option<Address>,
}

impl EventFilter {
    /// Accept every event.
    #[must_use]
    pub fn all() -> Self {
        Self {
            kinds: Vec::new(),
            owner: None,
        }
    }

    /// Accept only the listed kinds.
    #[must_use]
    pub fn kinds(kinds: Vec<EventKind>) -> Self {
        Self { kinds, owner: None }
    }

    /// Accept a single kind.
    #[must_use]
    pub fn kind(kind: EventKind) -> Self {
        Self::kinds(vec![kind])
    }

    /// Narrow to events naming `owner`.
    #[must_use]
    pub fn with_owner(mut self, owner: Address) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Check whether an event passes this filter.
    #[must_use]
    pub fn matches(&self, event: &TodoEvent) -> bool {
        if !self.kinds.is_empty() && !self.kinds.contains(&event.kind()) {
            return false;
        }
        match self.owner {
            Some(owner) => event.owner() == Some(owner),
            None => true,
        }
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::all()
    }
}
