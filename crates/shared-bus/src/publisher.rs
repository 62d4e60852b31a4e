//! # Notification Publisher
//!
//! Sending half of the bus and the in-memory bus itself.

use crate::events::{EventFilter, TodoEvent};
use crate::subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Anything notifications can be published to.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Hand `event` to every live subscription.
    ///
    /// Returns how many subscriptions were live at the time; filters are
    /// applied on the receiving side.
    async fn publish(&self, event: TodoEvent) -> usize;

    /// Publish attempts so far, delivered or not.
    fn events_published(&self) -> u64;
}

/// Broadcast-backed bus.
///
/// Each subscription gets its own bounded buffer of `capacity` events.
/// `close` ends every subscription once drained and refuses new ones.
pub struct InMemoryEventBus {
    sender: RwLock<Option<broadcast::Sender<TodoEvent>>>,
    events_published: AtomicU64,
    capacity: usize,
}

impl InMemoryEventBus {
    /// Bus with `DEFAULT_CHANNEL_CAPACITY`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus buffering up to `capacity` events per subscription.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: RwLock::new(Some(sender)),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    fn sender(&self) -> Option<broadcast::Sender<TodoEvent>> {
        self.sender.read().ok().and_then(|slot| slot.clone())
    }

    /// Open a subscription. Only events published from now on are seen.
    pub fn subscribe(&self, filter: EventFilter) -> Result<Subscription, SubscriptionError> {
        let sender = self.sender().ok_or(SubscriptionError::Closed)?;
        debug!(kinds = ?filter.kinds, owner = ?filter.owner, "Subscription opened");
        Ok(Subscription::new(sender.subscribe(), filter))
    }

    /// `subscribe`, as a stream.
    pub fn event_stream(&self, filter: EventFilter) -> Result<EventStream, SubscriptionError> {
        self.subscribe(filter).map(EventStream::new)
    }

    /// Stop accepting subscriptions and end the existing ones after they
    /// drain.
    pub fn close(&self) {
        let closed = self
            .sender
            .write()
            .map(|mut slot| slot.take().is_some())
            .unwrap_or(false);
        if closed {
            info!("Notification bus closed");
        }
    }

    /// True once `close` was called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender().is_none()
    }

    /// Live subscriptions, whatever their filter.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender().map_or(0, |s| s.receiver_count())
    }

    /// Per-subscription buffer size.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: TodoEvent) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);
        let (kind, id) = (event.kind(), event.id());

        let Some(sender) = self.sender() else {
            warn!(kind = kind.name(), id = %id, "Notification dropped, bus closed");
            return 0;
        };
        // `send` only fails when nobody is subscribed.
        let delivered = sender.send(event).unwrap_or(0);
        debug!(kind = kind.name(), id = %id, delivered, "Notification published");
        delivered
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, filter: EventFilter) -> Result<Subscription, SubscriptionError> {
        InMemoryEventBus::subscribe(self, filter)
    }
}
