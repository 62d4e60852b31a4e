//! # Ledger Node Service
//!
//! Runs the record store behind a single-writer transaction queue.
//!
//! ## Flow
//!
//! 1. `submit` decodes the call, assigns the sender's nonce, hashes the
//!    transaction and enqueues it
//! 2. The writer task applies transactions one at a time, journals a block
//!    per transaction and publishes the emitted notifications
//! 3. The receipt is recorded last; `wait_for_confirmation` resolves on it
//!
//! Settled receipts are ledger data and stay queryable, up to
//! `receipt_retention` of them; past that the oldest are forgotten and a
//! late wait on them fails with `UnknownTransaction`.
//!
//! Reads bypass the queue and take a shared lock on canonical state.

use crate::domain::{InvariantViolation, Journal, JournalError, RecordStore};
use crate::domain::journal::compute_tx_hash;
use crate::errors::LedgerError;
use crate::ports::{Clock, RecordStoreApi};
use crate::DEFAULT_CHAIN_ID;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_bus::{EventFilter, EventPublisher, InMemoryEventBus, Subscription};
use shared_types::{
    encode, Address, Hash, QueryResponse, QueryResult, ReceiptStatus, TodoCall, TodoQuery,
    TransactionReceipt, TransactionRequest,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Ledger node configuration.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Chain id committed to by the genesis block.
    pub chain_id: u64,
    /// Capacity of the writer queue.
    pub queue_capacity: usize,
    /// Default wait for `wait_for_confirmation`.
    pub confirmation_timeout: Duration,
    /// Delay before each transaction is applied. Zero applies immediately.
    pub block_time: Duration,
    /// Settled receipts kept for `wait_for_confirmation`, oldest dropped first.
    pub receipt_retention: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
            queue_capacity: 256,
            confirmation_timeout: Duration::from_secs(30),
            block_time: Duration::ZERO,
            receipt_retention: 4096,
        }
    }
}

/// Counters for the ledger node.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LedgerStats {
    /// Transactions accepted onto the queue.
    pub transactions_submitted: u64,
    /// Transactions that changed state.
    pub transactions_applied: u64,
    /// Transactions the store rejected with a fault.
    pub transactions_reverted: u64,
    /// Submissions refused before queueing.
    pub submissions_rejected: u64,
    /// Notifications handed to the bus.
    pub notifications_published: u64,
}

/// A queued transaction.
#[derive(Debug)]
struct PendingTransaction {
    tx_hash: Hash,
    from: Address,
    nonce: u64,
    call: TodoCall,
}

/// Canonical state: the store and its journal move together.
#[derive(Debug)]
struct LedgerState {
    store: RecordStore,
    journal: Journal,
}

/// Receipt slot per submitted transaction; `None` until applied.
type ReceiptSlot = watch::Sender<Option<TransactionReceipt>>;

/// Receipt slots plus the order in which they settled.
#[derive(Default)]
struct ReceiptBook {
    slots: HashMap<Hash, ReceiptSlot>,
    settled: VecDeque<Hash>,
}

impl ReceiptBook {
    /// Fill the slot of `receipt` and forget the oldest settled receipts
    /// beyond `retention`. Waiters already subscribed keep their copy.
    fn settle(&mut self, receipt: TransactionReceipt, retention: usize) {
        let tx_hash = receipt.tx_hash;
        let Some(slot) = self.slots.get(&tx_hash) else {
            return;
        };
        slot.send_replace(Some(receipt));
        self.settled.push_back(tx_hash);

        while self.settled.len() > retention {
            if let Some(oldest) = self.settled.pop_front() {
                self.slots.remove(&oldest);
            }
        }
    }

    /// Drop slots that will never settle.
    fn drop_pending(&mut self) {
        self.slots.retain(|_, slot| slot.borrow().is_some());
    }
}

type SharedReceipts = Arc<Mutex<ReceiptBook>>;

/// The ledger node.
pub struct LedgerNode {
    config: LedgerConfig,
    state: Arc<RwLock<LedgerState>>,
    bus: Arc<InMemoryEventBus>,
    queue: mpsc::Sender<PendingTransaction>,
    receipts: SharedReceipts,
    nonces: Mutex<HashMap<Address, u64>>,
    stats: Arc<Mutex<LedgerStats>>,
    shutdown_tx: watch::Sender<bool>,
    writer: Mutex<Option<JoinHandle<()>>>,
}

impl LedgerNode {
    /// Create the node and spawn its writer task.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(
        config: LedgerConfig,
        bus: Arc<InMemoryEventBus>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        let state = Arc::new(RwLock::new(LedgerState {
            store: RecordStore::new(),
            journal: Journal::new(config.chain_id, clock.now()),
        }));
        let receipts: SharedReceipts = Arc::new(Mutex::new(ReceiptBook::default()));
        let stats = Arc::new(Mutex::new(LedgerStats::default()));
        let (queue, queue_rx) = mpsc::channel(config.queue_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let writer = Writer {
            state: Arc::clone(&state),
            bus: Arc::clone(&bus),
            receipts: Arc::clone(&receipts),
            stats: Arc::clone(&stats),
            clock,
            block_time: config.block_time,
            receipt_retention: config.receipt_retention,
        };
        let handle = tokio::spawn(writer.run(queue_rx, shutdown_rx));

        info!(
            chain_id = config.chain_id,
            queue_capacity = config.queue_capacity,
            "Ledger node started"
        );

        Arc::new(Self {
            config,
            state,
            bus,
            queue,
            receipts,
            nonces: Mutex::new(HashMap::new()),
            stats,
            shutdown_tx,
            writer: Mutex::new(Some(handle)),
        })
    }

    // =========================================================================
    // WRITE PATH
    // =========================================================================

    /// Queue a transaction and return its hash.
    #[instrument(skip(self, request), fields(from = %request.from))]
    pub fn submit(&self, request: TransactionRequest) -> Result<Hash, LedgerError> {
        if !self.is_running() {
            return Err(self.reject(LedgerError::Stopped));
        }

        let call = TodoCall::decode(&request.data)
            .map_err(|e| self.reject(LedgerError::MalformedCall(e.to_string())))?;

        let nonce = {
            let mut nonces = self.nonces.lock();
            let next = nonces.entry(request.from).or_insert(0);
            let nonce = *next;
            *next += 1;
            nonce
        };
        let tx_hash = compute_tx_hash(&request.from, nonce, &request.data);
        let method = call.method();

        let (slot, _) = watch::channel(None);
        self.receipts.lock().slots.insert(tx_hash, slot);

        let pending = PendingTransaction {
            tx_hash,
            from: request.from,
            nonce,
            call,
        };
        if let Err(e) = self.queue.try_send(pending) {
            self.receipts.lock().slots.remove(&tx_hash);
            let err = match e {
                TrySendError::Full(_) => LedgerError::QueueFull {
                    capacity: self.config.queue_capacity,
                },
                TrySendError::Closed(_) => LedgerError::Stopped,
            };
            return Err(self.reject(err));
        }

        self.stats.lock().transactions_submitted += 1;
        debug!(method, nonce, tx_hash = %hex::encode(tx_hash), "Transaction queued");
        Ok(tx_hash)
    }

    fn reject(&self, err: LedgerError) -> LedgerError {
        self.stats.lock().submissions_rejected += 1;
        warn!(error = %err, "Transaction rejected");
        err
    }

    /// Wait for the receipt of `tx_hash`.
    ///
    /// `None` waits for the configured confirmation timeout.
    pub async fn wait_for_confirmation(
        &self,
        tx_hash: Hash,
        timeout: Option<Duration>,
    ) -> Result<TransactionReceipt, LedgerError> {
        let timeout = timeout.unwrap_or(self.config.confirmation_timeout);
        let mut slot = self
            .receipts
            .lock()
            .slots
            .get(&tx_hash)
            .map(watch::Sender::subscribe)
            .ok_or(LedgerError::UnknownTransaction { tx_hash })?;

        let waited = tokio::time::timeout(timeout, async move {
            let receipt = slot.wait_for(Option::is_some).await.map(|r| (*r).clone());
            receipt
        })
        .await;

        match waited {
            Ok(Ok(Some(receipt))) => Ok(receipt),
            // Slot dropped at shutdown before the transaction was applied
            Ok(Ok(None) | Err(_)) => Err(LedgerError::Stopped),
            Err(_) => Err(LedgerError::ConfirmationTimeout {
                tx_hash,
                waited_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    // =========================================================================
    // READ PATH
    // =========================================================================

    /// Run an encoded query and return the encoded `QueryResult`.
    pub fn query(&self, data: &[u8]) -> Result<Vec<u8>, LedgerError> {
        let query =
            TodoQuery::decode(data).map_err(|e| LedgerError::MalformedQuery(e.to_string()))?;
        let result = self.execute_query(&query);
        Ok(encode(&result)?)
    }

    /// Run a typed query against canonical state.
    #[must_use]
    pub fn execute_query(&self, query: &TodoQuery) -> QueryResult {
        let state = self.state.read();
        match query {
            TodoQuery::GetTodo { id } => state.store.get(*id).map(QueryResponse::Todo),
            TodoQuery::GetUserTodos { owner } => {
                Ok(QueryResponse::Todos(state.store.list_by_owner(owner)))
            }
        }
    }

    /// Subscribe to notifications published from now on.
    pub fn subscribe(&self, filter: EventFilter) -> Result<Subscription, LedgerError> {
        Ok(self.bus.subscribe(filter)?)
    }

    // =========================================================================
    // AUDIT & LIFECYCLE
    // =========================================================================

    /// Recompute the journal's hash chain.
    pub fn verify_journal(&self) -> Result<(), JournalError> {
        self.state.read().journal.verify()
    }

    /// Audit the store's indexes.
    #[must_use]
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        self.state.read().store.check_invariants()
    }

    /// Height of the latest block.
    #[must_use]
    pub fn block_number(&self) -> u64 {
        self.state.read().journal.head().number
    }

    /// Configured chain id.
    #[must_use]
    pub fn chain_id(&self) -> u64 {
        self.config.chain_id
    }

    /// Receipts currently held, settled or pending.
    #[must_use]
    pub fn receipt_count(&self) -> usize {
        self.receipts.lock().slots.len()
    }

    /// Snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> LedgerStats {
        self.stats.lock().clone()
    }

    /// The bus notifications are published on.
    #[must_use]
    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    /// Returns false once `shutdown` was called.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !*self.shutdown_tx.borrow()
    }

    /// Stop the writer and close the bus.
    ///
    /// Transactions still queued are dropped; their waiters get `Stopped`.
    pub async fn shutdown(&self) {
        if self.shutdown_tx.send_replace(true) {
            return;
        }

        let handle = self.writer.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Ledger writer ended abnormally");
            }
        }

        self.receipts.lock().drop_pending();
        self.bus.close();
        info!(block = self.block_number(), "Ledger node stopped");
    }
}

#[async_trait]
impl RecordStoreApi for LedgerNode {
    async fn submit_transaction(&self, request: TransactionRequest) -> Result<Hash, LedgerError> {
        self.submit(request)
    }

    async fn wait_for_confirmation(
        &self,
        tx_hash: Hash,
        timeout: Option<Duration>,
    ) -> Result<TransactionReceipt, LedgerError> {
        LedgerNode::wait_for_confirmation(self, tx_hash, timeout).await
    }

    async fn read_state(&self, query: Vec<u8>) -> Result<Vec<u8>, LedgerError> {
        self.query(&query)
    }

    fn subscribe(&self, filter: EventFilter) -> Result<Subscription, LedgerError> {
        LedgerNode::subscribe(self, filter)
    }
}

// =============================================================================
// WRITER TASK
// =============================================================================

struct Writer {
    state: Arc<RwLock<LedgerState>>,
    bus: Arc<InMemoryEventBus>,
    receipts: SharedReceipts,
    stats: Arc<Mutex<LedgerStats>>,
    clock: Arc<dyn Clock>,
    block_time: Duration,
    receipt_retention: usize,
}

impl Writer {
    async fn run(
        self,
        mut queue: mpsc::Receiver<PendingTransaction>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        debug!("Ledger writer running");
        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                next = queue.recv() => match next {
                    Some(tx) => self.apply(tx).await,
                    None => break,
                },
            }
        }
        debug!("Ledger writer exited");
    }

    async fn apply(&self, tx: PendingTransaction) {
        if !self.block_time.is_zero() {
            tokio::time::sleep(self.block_time).await;
        }
        let timestamp = self.clock.now();

        let (status, logs, block_number) = {
            let mut state = self.state.write();
            let (status, logs) = match state.store.apply(tx.from, &tx.call, timestamp) {
                Ok(event) => (ReceiptStatus::Success, vec![event]),
                Err(fault) => (ReceiptStatus::Reverted(fault), Vec::new()),
            };
            let block =
                state
                    .journal
                    .append(tx.tx_hash, tx.from, tx.nonce, timestamp, &status, &logs);
            (status, logs, block.number)
        };

        match &status {
            ReceiptStatus::Success => debug!(
                method = tx.call.method(),
                block = block_number,
                "Transaction applied"
            ),
            ReceiptStatus::Reverted(fault) => info!(
                method = tx.call.method(),
                block = block_number,
                fault = fault.kind(),
                "Transaction reverted"
            ),
        }

        for log in &logs {
            self.bus.publish(log.clone()).await;
        }

        {
            let mut stats = self.stats.lock();
            match status {
                ReceiptStatus::Success => stats.transactions_applied += 1,
                ReceiptStatus::Reverted(_) => stats.transactions_reverted += 1,
            }
            stats.notifications_published += logs.len() as u64;
        }

        let receipt = TransactionReceipt {
            tx_hash: tx.tx_hash,
            block_number,
            from: tx.from,
            nonce: tx.nonce,
            status,
            logs,
        };
        self.receipts.lock().settle(receipt, self.receipt_retention);
    }
}
