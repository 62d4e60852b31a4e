//! # Subscriptions
//!
//! Receiving half of the notification bus. A `Subscription` is pulled with
//! `recv`/`try_recv`; an `EventStream` adapts one to `tokio_stream`.

use crate::events::{EventFilter, TodoEvent};
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::debug;

/// Why a subscription produced no event.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was closed and everything buffered has been read.
    #[error("notification bus closed")]
    Closed,

    /// The buffer overflowed; the oldest notifications were discarded.
    #[error("subscriber lagged, {skipped} notifications skipped")]
    Lagged {
        /// Number of events that were dropped for this subscriber.
        skipped: u64,
    },
}

impl From<broadcast::error::RecvError> for SubscriptionError {
    fn from(err: broadcast::error::RecvError) -> Self {
        match err {
            broadcast::error::RecvError::Closed => Self::Closed,
            broadcast::error::RecvError::Lagged(skipped) => Self::Lagged { skipped },
        }
    }
}

/// Anything notifications can be subscribed from.
pub trait EventSubscriber: Send + Sync {
    /// Open a subscription for notifications matching `filter`.
    fn subscribe(&self, filter: EventFilter) -> Result<Subscription, SubscriptionError>;
}

/// Live interest in a set of notifications.
///
/// Dropping the handle is the unsubscribe operation.
pub struct Subscription {
    receiver: broadcast::Receiver<TodoEvent>,
    filter: EventFilter,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<TodoEvent>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Wait for the next matching notification.
    ///
    /// `Lagged` leaves the subscription usable; `Closed` is final.
    pub async fn recv(&mut self) -> Result<TodoEvent, SubscriptionError> {
        loop {
            let event = self.receiver.recv().await.map_err(|e| {
                let err = SubscriptionError::from(e);
                debug!(error = %err, "Subscription interrupted");
                err
            })?;
            if self.filter.matches(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking `recv`. `Ok(None)` means nothing matching is buffered.
    pub fn try_recv(&mut self) -> Result<Option<TodoEvent>, SubscriptionError> {
        use broadcast::error::TryRecvError;
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => return Ok(Some(event)),
                Ok(_) => {}
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Closed) => return Err(SubscriptionError::Closed),
                Err(TryRecvError::Lagged(skipped)) => {
                    return Err(SubscriptionError::Lagged { skipped })
                }
            }
        }
    }

    /// The filter this subscription was opened with.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

/// `Subscription` as a `tokio_stream::Stream`.
///
/// Lag is logged and skipped; the stream ends when the bus closes.
pub struct EventStream {
    inner: BroadcastStream<TodoEvent>,
    filter: EventFilter,
}

impl EventStream {
    /// Wrap `subscription`.
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        let Subscription { receiver, filter } = subscription;
        Self {
            inner: BroadcastStream::new(receiver),
            filter,
        }
    }

    /// The filter this stream was opened with.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl Stream for EventStream {
    type Item = TodoEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match ready!(Pin::new(&mut self.inner).poll_next(cx)) {
                Some(Ok(event)) if self.filter.matches(&event) => {
                    return Poll::Ready(Some(event))
                }
                Some(Ok(_)) => {}
                Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                    debug!(skipped, "Notification stream lagged");
                }
                None => return Poll::Ready(None),
            }
        }
    }
}
