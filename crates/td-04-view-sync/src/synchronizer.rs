//! # View Synchronizer
//!
//! Owns the view for the connected identity and publishes it on a `watch`
//! channel. Every identity change bumps an epoch; work that started under
//! an older epoch still runs to completion but its result is dropped.
//!
//! Refreshes and submits overlap, so the view counts the operations of the
//! current epoch in flight and only reports `Idle` once none are left.

use crate::config::SyncConfig;
use crate::errors::SyncError;
use crate::intent::TodoIntent;
use crate::state::{SyncStatus, TodoView};
use shared_types::{Address, TodoError, TransactionReceipt};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use td_02_record_accessor::{LedgerClient, RecordAccessor};
use td_03_change_listener::RefreshSignal;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};

/// Per-identity view synchronizer.
pub struct ViewSynchronizer<C: LedgerClient> {
    accessor: Arc<RecordAccessor<C>>,
    config: SyncConfig,
    view: watch::Sender<TodoView>,
    epoch: AtomicU64,
    /// Operations of the current epoch in flight. Only touched while the
    /// view is locked for writing.
    in_flight: AtomicUsize,
    /// One submit in flight at a time.
    submit_lock: Mutex<()>,
    /// Refreshes publish in the order they read.
    refresh_lock: Mutex<()>,
    refreshes: AtomicU64,
}

impl<C: LedgerClient> ViewSynchronizer<C> {
    /// Create a disconnected synchronizer.
    pub fn new(accessor: Arc<RecordAccessor<C>>, config: SyncConfig) -> Self {
        let (view, _) = watch::channel(TodoView::default());
        Self {
            accessor,
            config,
            view,
            epoch: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            submit_lock: Mutex::new(()),
            refresh_lock: Mutex::new(()),
            refreshes: AtomicU64::new(0),
        }
    }

    /// Receiver for view updates.
    pub fn subscribe(&self) -> watch::Receiver<TodoView> {
        self.view.subscribe()
    }

    /// Current view.
    pub fn snapshot(&self) -> TodoView {
        self.view.borrow().clone()
    }

    /// Connected identity.
    pub fn identity(&self) -> Option<Address> {
        self.view.borrow().identity
    }

    /// The accessor mutations go through.
    pub fn accessor(&self) -> &Arc<RecordAccessor<C>> {
        &self.accessor
    }

    /// Refreshes that reached the ledger, for diagnostics.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }

    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    // =========================================================================
    // IDENTITY
    // =========================================================================

    /// Switch to `identity` with an empty view.
    pub fn connect(&self, identity: Address) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.reset(TodoView::connected(identity));
        info!(identity = %identity, epoch, "View connected");
    }

    /// Clear identity, records and error.
    pub fn disconnect(&self) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.reset(TodoView::default());
        info!(epoch, "View disconnected");
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Re-read every record of `identity` and replace the view.
    ///
    /// Fails with `NotConnected` if `identity` is not the connected one.
    #[instrument(skip_all, fields(identity = %identity))]
    pub async fn refresh(&self, identity: Address) -> Result<(), SyncError> {
        let _ordered = self.refresh_lock.lock().await;
        let epoch = self.current_epoch();
        if self.identity() != Some(identity) {
            return Err(SyncError::NotConnected);
        }

        self.begin(epoch);
        self.refreshes.fetch_add(1, Ordering::Relaxed);
        let result = self.accessor.get_user_todos(identity).await;

        match result {
            Ok(todos) => {
                debug!(count = todos.len(), "View refreshed");
                self.complete(epoch, |view| view.todos = todos);
                Ok(())
            }
            Err(e) => {
                let err = SyncError::from(e);
                warn!(error = %err, "Refresh failed");
                self.abort(epoch, err.clone());
                Err(err)
            }
        }
    }

    /// Forward an intent and wait for its confirmation.
    ///
    /// The view is never updated here; the resulting notification drives a
    /// refresh. On failure the view keeps its records and shows the error.
    #[instrument(skip(self))]
    pub async fn submit(&self, intent: TodoIntent) -> Result<TransactionReceipt, SyncError> {
        let _serialized = self.submit_lock.lock().await;
        let epoch = self.current_epoch();
        let identity = self.identity().ok_or(SyncError::NotConnected)?;

        if self.config.reject_blank_content
            && intent.content().is_some_and(|c| c.trim().is_empty())
        {
            let err = SyncError::Fault(TodoError::InvalidInput);
            self.fail(epoch, err.clone());
            return Err(err);
        }

        self.begin(epoch);
        let result = self.accessor.execute(identity, &intent.to_call()).await;

        match result {
            Ok(receipt) => {
                debug!(block = receipt.block_number, "Intent confirmed");
                self.complete(epoch, |_| {});
                Ok(receipt)
            }
            Err(e) => {
                let err = SyncError::from(e);
                warn!(error = %err, "Intent failed");
                self.abort(epoch, err.clone());
                Err(err)
            }
        }
    }

    /// Show `err` on the current view. Records and work in flight are left
    /// as they are; the next success clears it.
    pub fn report(&self, err: SyncError) {
        warn!(error = %err, "Error reported to view");
        self.fail(self.current_epoch(), err);
    }

    /// Perform one refresh per wake-up of `signal`. Runs until cancelled.
    pub async fn run_refresh_loop(&self, signal: &RefreshSignal) {
        loop {
            signal.notified().await;
            let Some(identity) = self.identity() else {
                continue;
            };
            if let Err(e) = self.refresh(identity).await {
                debug!(error = %e, "Triggered refresh failed");
            }
        }
    }

    // =========================================================================
    // STATUS
    // =========================================================================

    fn reset(&self, view: TodoView) {
        self.view.send_modify(|current| {
            *current = view;
            self.in_flight.store(0, Ordering::Relaxed);
        });
    }

    fn begin(&self, epoch: u64) {
        self.publish(epoch, |view| {
            self.in_flight.fetch_add(1, Ordering::Relaxed);
            if !matches!(view.status, SyncStatus::Error(_)) {
                view.status = SyncStatus::Loading;
            }
        });
    }

    /// End an operation started with `begin` successfully.
    fn complete(&self, epoch: u64, update: impl FnOnce(&mut TodoView)) {
        self.publish(epoch, |view| {
            update(view);
            view.status = if self.finish() == 0 {
                SyncStatus::Idle
            } else {
                SyncStatus::Loading
            };
        });
    }

    /// End an operation started with `begin` with an error.
    fn abort(&self, epoch: u64, err: SyncError) {
        self.publish(epoch, |view| {
            self.finish();
            view.status = SyncStatus::Error(err);
        });
    }

    /// Count one operation as done; returns how many are still running.
    fn finish(&self) -> usize {
        let left = self.in_flight.load(Ordering::Relaxed).saturating_sub(1);
        self.in_flight.store(left, Ordering::Relaxed);
        left
    }

    fn fail(&self, epoch: u64, err: SyncError) {
        self.publish(epoch, |view| view.status = SyncStatus::Error(err));
    }

    /// Apply `update` unless the identity changed since `epoch`.
    fn publish(&self, epoch: u64, update: impl FnOnce(&mut TodoView)) {
        self.view.send_if_modified(|view| {
            if self.current_epoch() != epoch {
                debug!(epoch, "Dropping result from a previous identity");
                return false;
            }
            update(view);
            true
        });
    }
}
