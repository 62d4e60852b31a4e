//! # Todo Session
//!
//! Wires a change listener, a view synchronizer and the refresh loop for
//! one identity at a time.
//!
//! Connecting subscribes first and backfills second, so a change made
//! between the two is either in the backfill or triggers a later refresh.
//! The backfill runs even when some subscriptions could not be opened; the
//! view then shows the listener failure alongside the records it read.

use crate::config::SyncConfig;
use crate::errors::{SessionError, SyncError};
use crate::intent::TodoIntent;
use crate::state::TodoView;
use crate::synchronizer::ViewSynchronizer;
use shared_types::{Address, TransactionReceipt};
use std::sync::Arc;
use td_02_record_accessor::{LedgerClient, RecordAccessor, TransportError};
use td_03_change_listener::{ChangeListener, ListenerError, ListenerErrors, RefreshSignal};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// A client session: listener + synchronizer + refresh loop.
pub struct TodoSession<C: LedgerClient + 'static> {
    synchronizer: Arc<ViewSynchronizer<C>>,
    listener: ChangeListener<C>,
    refresh_loop: JoinHandle<()>,
}

impl<C: LedgerClient + 'static> TodoSession<C> {
    /// Build a disconnected session and start its refresh loop.
    ///
    /// # Returns
    ///
    /// The session and the channel reporting subscriptions that closed.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new(accessor: Arc<RecordAccessor<C>>, config: SyncConfig) -> (Self, ListenerErrors) {
        let signal = Arc::new(RefreshSignal::new());
        let (listener, errors) =
            ChangeListener::new(Arc::clone(accessor.client()), Arc::clone(&signal));
        let synchronizer = Arc::new(ViewSynchronizer::new(accessor, config));

        let refresh_loop = {
            let synchronizer = Arc::clone(&synchronizer);
            tokio::spawn(async move { synchronizer.run_refresh_loop(&signal).await })
        };

        let session = Self {
            synchronizer,
            listener,
            refresh_loop,
        };
        (session, errors)
    }

    /// Connect `identity`: subscribe, then backfill the view.
    ///
    /// A listener failure is returned after the backfill, with the view
    /// left in `Error`. Kinds that did subscribe stay active.
    pub async fn connect(&self, identity: Address) -> Result<(), SessionError> {
        self.synchronizer.connect(identity);
        let watched = self.listener.watch(identity);
        let refreshed = self.synchronizer.refresh(identity).await;

        if let Err(e) = watched {
            warn!(identity = %identity, error = %e, "Session connected without full coverage");
            self.synchronizer.report(listener_fault(&e));
            return Err(e.into());
        }
        refreshed?;
        info!(identity = %identity, "Session connected");
        Ok(())
    }

    /// Move to another identity. Previous subscriptions are released and
    /// results still in flight for the old identity are ignored.
    pub async fn switch_identity(&self, identity: Address) -> Result<(), SessionError> {
        self.connect(identity).await
    }

    /// Release subscriptions and clear the view.
    pub fn disconnect(&self) {
        self.listener.unwatch();
        self.synchronizer.disconnect();
        info!("Session disconnected");
    }

    /// Forward an intent for the connected identity.
    pub async fn submit(&self, intent: TodoIntent) -> Result<TransactionReceipt, SyncError> {
        self.synchronizer.submit(intent).await
    }

    /// Re-fetch the connected identity's records now.
    pub async fn refresh(&self) -> Result<(), SyncError> {
        let identity = self.synchronizer.identity().ok_or(SyncError::NotConnected)?;
        self.synchronizer.refresh(identity).await
    }

    /// Receiver for view updates.
    pub fn view(&self) -> watch::Receiver<TodoView> {
        self.synchronizer.subscribe()
    }

    /// Current view.
    pub fn snapshot(&self) -> TodoView {
        self.synchronizer.snapshot()
    }

    /// The synchronizer.
    pub fn synchronizer(&self) -> &Arc<ViewSynchronizer<C>> {
        &self.synchronizer
    }

    /// The listener.
    pub fn listener(&self) -> &ChangeListener<C> {
        &self.listener
    }
}

/// How a listener failure shows up in the view.
fn listener_fault(err: &ListenerError) -> SyncError {
    match err {
        ListenerError::SubscribeFailed { error, .. } => SyncError::Transport(error.clone()),
        ListenerError::NotWatching | ListenerError::SubscriptionClosed { .. } => {
            SyncError::Transport(TransportError::Disconnected)
        }
    }
}

impl<C: LedgerClient + 'static> Drop for TodoSession<C> {
    fn drop(&mut self) {
        self.refresh_loop.abort();
    }
}
