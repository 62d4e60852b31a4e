//! # Change Listener
//!
//! One forwarding task per notification kind. Each task owns its
//! subscription and turns every delivered notification into a refresh
//! trigger; aborting the task drops the subscription.

use crate::errors::ListenerError;
use crate::signal::RefreshSignal;
use parking_lot::Mutex;
use shared_bus::{EventFilter, Subscription, SubscriptionError};
use shared_types::{Address, EventKind};
use std::collections::HashMap;
use std::sync::Arc;
use td_02_record_accessor::{LedgerClient, TransportError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Receiving end for subscriptions that ended after `watch` returned.
pub type ListenerErrors = mpsc::UnboundedReceiver<ListenerError>;

/// Subscriptions held for the current identity.
struct Watched {
    identity: Address,
    generation: u64,
    tasks: HashMap<EventKind, JoinHandle<()>>,
}

impl Watched {
    fn abort_all(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

/// Per-identity notification listener.
pub struct ChangeListener<C: LedgerClient> {
    client: Arc<C>,
    signal: Arc<RefreshSignal>,
    errors: mpsc::UnboundedSender<ListenerError>,
    watched: Mutex<Option<Watched>>,
}

impl<C: LedgerClient> ChangeListener<C> {
    /// Create a listener that triggers `signal`.
    ///
    /// # Returns
    ///
    /// The listener and the channel on which closed subscriptions are
    /// reported.
    pub fn new(client: Arc<C>, signal: Arc<RefreshSignal>) -> (Self, ListenerErrors) {
        let (errors, errors_rx) = mpsc::unbounded_channel();
        let listener = Self {
            client,
            signal,
            errors,
            watched: Mutex::new(None),
        };
        (listener, errors_rx)
    }

    /// The signal this listener triggers.
    pub fn signal(&self) -> &Arc<RefreshSignal> {
        &self.signal
    }

    /// Identity currently watched.
    pub fn identity(&self) -> Option<Address> {
        self.watched.lock().as_ref().map(|w| w.identity)
    }

    /// Kinds with a live forwarding task.
    pub fn active_kinds(&self) -> Vec<EventKind> {
        let guard = self.watched.lock();
        let Some(watched) = guard.as_ref() else {
            return Vec::new();
        };
        let mut kinds: Vec<EventKind> = watched
            .tasks
            .iter()
            .filter(|(_, task)| !task.is_finished())
            .map(|(kind, _)| *kind)
            .collect();
        kinds.sort();
        kinds
    }

    /// Watch `identity`, releasing any previous subscriptions first.
    ///
    /// Subscriptions are established before this returns, so every
    /// notification emitted afterwards is seen. On `Err` the kinds not
    /// listed in the error are still active.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn watch(&self, identity: Address) -> Result<(), ListenerError> {
        let mut guard = self.watched.lock();
        if let Some(previous) = guard.as_mut() {
            previous.abort_all();
        }

        let generation = self.signal.advance();
        let mut watched = Watched {
            identity,
            generation,
            tasks: HashMap::new(),
        };

        let mut failed = Vec::new();
        let mut first_error: Option<TransportError> = None;
        for kind in EventKind::ALL {
            match self.spawn_forwarder(kind, identity, generation) {
                Ok(task) => {
                    watched.tasks.insert(kind, task);
                }
                Err(e) => {
                    warn!(kind = kind.name(), identity = %identity, error = %e, "Subscribe failed");
                    failed.push(kind);
                    first_error.get_or_insert(e);
                }
            }
        }
        *guard = Some(watched);

        info!(identity = %identity, generation, active = EventKind::ALL.len() - failed.len(), "Watching identity");
        match first_error {
            None => Ok(()),
            Some(error) => Err(ListenerError::SubscribeFailed {
                kinds: failed,
                error,
            }),
        }
    }

    /// Re-establish the subscription for one kind of the current identity.
    pub fn resubscribe(&self, kind: EventKind) -> Result<(), ListenerError> {
        let mut guard = self.watched.lock();
        let watched = guard.as_mut().ok_or(ListenerError::NotWatching)?;

        if let Some(task) = watched.tasks.remove(&kind) {
            task.abort();
        }
        let task = self
            .spawn_forwarder(kind, watched.identity, watched.generation)
            .map_err(|error| ListenerError::SubscribeFailed {
                kinds: vec![kind],
                error,
            })?;
        watched.tasks.insert(kind, task);

        debug!(kind = kind.name(), identity = %watched.identity, "Resubscribed");
        Ok(())
    }

    /// Release every subscription. Pending triggers become stale.
    pub fn unwatch(&self) {
        if let Some(mut watched) = self.watched.lock().take() {
            watched.abort_all();
            self.signal.advance();
            info!(identity = %watched.identity, "Stopped watching identity");
        }
    }

    fn spawn_forwarder(
        &self,
        kind: EventKind,
        identity: Address,
        generation: u64,
    ) -> Result<JoinHandle<()>, TransportError> {
        let subscription = self.client.subscribe(filter_for(kind, identity))?;
        let forwarder = Forwarder {
            kind,
            identity,
            generation,
            signal: Arc::clone(&self.signal),
            errors: self.errors.clone(),
        };
        Ok(tokio::spawn(forwarder.run(subscription)))
    }
}

impl<C: LedgerClient> Drop for ChangeListener<C> {
    fn drop(&mut self) {
        if let Some(mut watched) = self.watched.get_mut().take() {
            watched.abort_all();
        }
    }
}

/// Subscription filter for `kind` on behalf of `identity`.
///
/// Only creation carries an owner, so only creation can be narrowed; the
/// other kinds are received for every record and re-checked by the refresh.
#[must_use]
pub fn filter_for(kind: EventKind, identity: Address) -> EventFilter {
    match kind {
        EventKind::Created => EventFilter::kind(kind).with_owner(identity),
        EventKind::Updated | EventKind::Toggled | EventKind::Deleted => EventFilter::kind(kind),
    }
}

struct Forwarder {
    kind: EventKind,
    identity: Address,
    generation: u64,
    signal: Arc<RefreshSignal>,
    errors: mpsc::UnboundedSender<ListenerError>,
}

impl Forwarder {
    async fn run(self, mut subscription: Subscription) {
        loop {
            match subscription.recv().await {
                Ok(event) => {
                    debug!(kind = self.kind.name(), id = %event.id(), "Notification observed");
                    self.signal.trigger(self.generation);
                }
                Err(SubscriptionError::Lagged { skipped }) => {
                    // Missed notifications may have changed the view.
                    warn!(kind = self.kind.name(), skipped, "Subscription lagged");
                    self.signal.trigger(self.generation);
                }
                Err(SubscriptionError::Closed) => {
                    warn!(kind = self.kind.name(), identity = %self.identity, "Subscription closed");
                    let _ = self.errors.send(ListenerError::SubscriptionClosed {
                        kind: self.kind,
                        identity: self.identity,
                    });
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shared_bus::{EventPublisher, InMemoryEventBus};
    use shared_types::{Hash, TodoEvent, TodoId, TransactionReceipt, TransactionRequest};
    use std::time::Duration;
    use td_01_record_store::{LedgerConfig, LedgerNode, SystemClock};
    use td_02_record_accessor::{AccessorConfig, InProcessLedger, RecordAccessor};
    use tokio::time::{sleep, timeout};

    const ALICE: Address = Address::repeat(0xa1);
    const BOB: Address = Address::repeat(0xb0);

    struct Fixture {
        node: Arc<LedgerNode>,
        accessor: RecordAccessor<InProcessLedger>,
        listener: ChangeListener<InProcessLedger>,
        errors: ListenerErrors,
    }

    fn fixture() -> Fixture {
        let bus = Arc::new(InMemoryEventBus::new());
        let node = LedgerNode::start(LedgerConfig::default(), bus, Arc::new(SystemClock));
        let client = Arc::new(InProcessLedger::new(node.clone()));
        let accessor = RecordAccessor::new(client.clone(), AccessorConfig::default());
        let (listener, errors) = ChangeListener::new(client, Arc::new(RefreshSignal::new()));
        Fixture {
            node,
            accessor,
            listener,
            errors,
        }
    }

    /// In-process ledger that refuses subscriptions for one kind.
    struct RefusingClient {
        inner: InProcessLedger,
        refused: EventKind,
    }

    #[async_trait]
    impl LedgerClient for RefusingClient {
        async fn submit_transaction(
            &self,
            request: TransactionRequest,
        ) -> Result<Hash, TransportError> {
            self.inner.submit_transaction(request).await
        }

        async fn wait_for_confirmation(
            &self,
            tx_hash: Hash,
            timeout: Duration,
        ) -> Result<TransactionReceipt, TransportError> {
            self.inner.wait_for_confirmation(tx_hash, timeout).await
        }

        async fn read_state(&self, query: Vec<u8>) -> Result<Vec<u8>, TransportError> {
            self.inner.read_state(query).await
        }

        fn subscribe(&self, filter: EventFilter) -> Result<Subscription, TransportError> {
            if filter.kinds == [self.refused] {
                return Err(TransportError::Disconnected);
            }
            self.inner.subscribe(filter)
        }
    }

    async fn expect_wake(signal: &RefreshSignal) {
        timeout(Duration::from_secs(1), signal.notified())
            .await
            .expect("refresh trigger");
    }

    async fn expect_quiet(signal: &RefreshSignal) {
        assert!(
            timeout(Duration::from_millis(100), signal.notified())
                .await
                .is_err(),
            "unexpected refresh trigger"
        );
    }

    #[test]
    fn test_filters() {
        assert_eq!(
            filter_for(EventKind::Created, ALICE),
            EventFilter::kind(EventKind::Created).with_owner(ALICE)
        );
        assert_eq!(
            filter_for(EventKind::Toggled, ALICE),
            EventFilter::kind(EventKind::Toggled)
        );
    }

    #[tokio::test]
    async fn test_own_creation_triggers_refresh() {
        let f = fixture();
        f.listener.watch(ALICE).unwrap();
        assert_eq!(f.listener.active_kinds(), EventKind::ALL.to_vec());

        f.accessor.create_todo(ALICE, "mine").await.unwrap();

        expect_wake(f.listener.signal()).await;
    }

    #[tokio::test]
    async fn test_foreign_creation_is_filtered() {
        let f = fixture();
        f.listener.watch(ALICE).unwrap();

        f.accessor.create_todo(BOB, "not mine").await.unwrap();
        f.accessor.create_todo(ALICE, "mine").await.unwrap();

        expect_wake(f.listener.signal()).await;
        // Only Alice's creation was forwarded
        assert_eq!(f.listener.signal().accepted(), 1);
    }

    #[tokio::test]
    async fn test_foreign_edits_still_trigger() {
        let f = fixture();
        let id = f.accessor.create_todo(BOB, "bob's").await.unwrap();
        f.listener.watch(ALICE).unwrap();

        f.accessor.toggle_todo(BOB, id).await.unwrap();

        expect_wake(f.listener.signal()).await;
    }

    #[tokio::test]
    async fn test_no_replay_of_earlier_notifications() {
        let f = fixture();
        f.accessor.create_todo(ALICE, "before").await.unwrap();

        f.listener.watch(ALICE).unwrap();

        expect_quiet(f.listener.signal()).await;
    }

    #[tokio::test]
    async fn test_unwatch_releases_subscriptions() {
        let f = fixture();
        f.listener.watch(ALICE).unwrap();
        f.listener.unwatch();

        assert!(f.listener.identity().is_none());
        assert!(f.listener.active_kinds().is_empty());

        f.accessor.create_todo(ALICE, "after").await.unwrap();
        expect_quiet(f.listener.signal()).await;
    }

    #[tokio::test]
    async fn test_watch_replaces_identity() {
        let f = fixture();
        f.listener.watch(ALICE).unwrap();
        f.listener.watch(BOB).unwrap();
        assert_eq!(f.listener.identity(), Some(BOB));

        f.accessor.create_todo(ALICE, "alice").await.unwrap();
        expect_quiet(f.listener.signal()).await;

        f.accessor.create_todo(BOB, "bob").await.unwrap();
        expect_wake(f.listener.signal()).await;
    }

    #[tokio::test]
    async fn test_closed_subscriptions_reported() {
        let mut f = fixture();
        f.listener.watch(ALICE).unwrap();

        f.node.shutdown().await;

        let mut closed = Vec::new();
        for _ in 0..EventKind::ALL.len() {
            let err = timeout(Duration::from_secs(1), f.errors.recv())
                .await
                .expect("error report")
                .expect("channel open");
            let ListenerError::SubscriptionClosed { kind, identity } = err else {
                panic!("unexpected error {err:?}");
            };
            assert_eq!(identity, ALICE);
            closed.push(kind);
        }
        closed.sort();
        assert_eq!(closed, EventKind::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_watch_on_stopped_ledger_fails() {
        let f = fixture();
        f.node.shutdown().await;

        let err = f.listener.watch(ALICE).unwrap_err();
        assert_eq!(
            err,
            ListenerError::SubscribeFailed {
                kinds: EventKind::ALL.to_vec(),
                error: TransportError::Disconnected,
            }
        );
        assert_eq!(f.listener.identity(), Some(ALICE));
        assert!(f.listener.active_kinds().is_empty());
    }

    #[tokio::test]
    async fn test_resubscribe() {
        let f = fixture();
        assert_eq!(
            f.listener.resubscribe(EventKind::Toggled),
            Err(ListenerError::NotWatching)
        );

        let id = f.accessor.create_todo(ALICE, "t").await.unwrap();
        f.listener.watch(ALICE).unwrap();
        f.listener.resubscribe(EventKind::Toggled).unwrap();
        assert_eq!(f.listener.active_kinds().len(), 4);

        f.accessor.toggle_todo(ALICE, id).await.unwrap();
        expect_wake(f.listener.signal()).await;
    }

    #[tokio::test]
    async fn test_partial_subscribe_keeps_other_kinds() {
        let f = fixture();
        let client = Arc::new(RefusingClient {
            inner: InProcessLedger::new(f.node.clone()),
            refused: EventKind::Toggled,
        });
        let (listener, _errors) = ChangeListener::new(client, Arc::new(RefreshSignal::new()));

        let err = listener.watch(ALICE).unwrap_err();

        assert_eq!(
            err,
            ListenerError::SubscribeFailed {
                kinds: vec![EventKind::Toggled],
                error: TransportError::Disconnected,
            }
        );
        assert_eq!(listener.identity(), Some(ALICE));
        assert_eq!(
            listener.active_kinds(),
            vec![EventKind::Created, EventKind::Updated, EventKind::Deleted]
        );

        f.accessor.create_todo(ALICE, "still seen").await.unwrap();
        expect_wake(listener.signal()).await;
    }

    #[tokio::test]
    async fn test_lagged_subscription_still_triggers() {
        let bus = Arc::new(InMemoryEventBus::with_capacity(1));
        let node = LedgerNode::start(LedgerConfig::default(), bus.clone(), Arc::new(SystemClock));
        let client = Arc::new(InProcessLedger::new(node));
        let (listener, _errors) = ChangeListener::new(client, Arc::new(RefreshSignal::new()));
        listener.watch(ALICE).unwrap();

        // The forwarders have not been polled yet on this runtime, so the
        // burst overflows every subscription's single-slot buffer.
        for id in 1..=3 {
            bus.publish(TodoEvent::Updated { id: TodoId(id) }).await;
        }

        expect_wake(listener.signal()).await;
        sleep(Duration::from_millis(50)).await;
        // One lag report per kind, plus the Updated event still buffered.
        assert_eq!(listener.signal().accepted(), 5);
        assert_eq!(listener.active_kinds(), EventKind::ALL.to_vec());
    }
}
