//! # Block Journal
//!
//! Append-only, hash-chained record of every applied transaction. One
//! transaction per block; reverted transactions are journaled too, with a
//! failed status and no logs.
//!
//! Each block hash commits to its parent hash and to the transaction it
//! carries, so rewriting any block breaks the chain from that point on.

use shared_types::{Address, Hash, ReceiptStatus, Timestamp, TodoEvent};
use sha3::{Digest, Keccak256};
use thiserror::Error;

/// Hash that precedes the genesis block.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Compute a transaction hash: `keccak256(from || nonce || data)`.
#[must_use]
pub fn compute_tx_hash(from: &Address, nonce: u64, data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(from.as_bytes());
    hasher.update(nonce.to_be_bytes());
    hasher.update(data);
    finalize(hasher)
}

fn finalize(hasher: Keccak256) -> Hash {
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Hash an ordered list of notifications.
#[must_use]
pub fn compute_logs_hash(logs: &[TodoEvent]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update((logs.len() as u64).to_be_bytes());
    for log in logs {
        hasher.update(log.kind().name().as_bytes());
        hasher.update(log.id().value().to_be_bytes());
        if let Some(owner) = log.owner() {
            hasher.update(owner.as_bytes());
        }
        if let Some(content) = log.content() {
            hasher.update((content.len() as u64).to_be_bytes());
            hasher.update(content.as_bytes());
        }
    }
    finalize(hasher)
}

/// One journaled block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerBlock {
    /// Height; genesis is 0.
    pub number: u64,
    /// Hash of the previous block.
    pub parent_hash: Hash,
    /// Block timestamp (unix seconds).
    pub timestamp: Timestamp,
    /// Transaction carried. Zero for genesis.
    pub tx_hash: Hash,
    /// Transaction sender. Zero for genesis.
    pub from: Address,
    /// Sender nonce.
    pub nonce: u64,
    /// Whether the transaction applied.
    pub success: bool,
    /// Hash of the emitted notifications.
    pub logs_hash: Hash,
    /// This block's hash.
    pub hash: Hash,
}

impl LedgerBlock {
    /// Recompute the hash from the other fields.
    #[must_use]
    pub fn compute_hash(&self) -> Hash {
        let mut hasher = Keccak256::new();
        hasher.update(b"block_");
        hasher.update(self.number.to_be_bytes());
        hasher.update(self.parent_hash);
        hasher.update(self.timestamp.to_be_bytes());
        hasher.update(self.tx_hash);
        hasher.update(self.from.as_bytes());
        hasher.update(self.nonce.to_be_bytes());
        hasher.update([u8::from(self.success)]);
        hasher.update(self.logs_hash);
        finalize(hasher)
    }
}

/// Tamper evidence found by `Journal::verify`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JournalError {
    /// Stored hash does not match the block contents.
    #[error("block {number}: hash mismatch")]
    HashMismatch {
        /// Offending block.
        number: u64,
    },

    /// Parent hash does not match the previous block.
    #[error("block {number}: broken parent link")]
    BrokenLink {
        /// Offending block.
        number: u64,
    },

    /// Heights are not contiguous.
    #[error("block at position {position} has number {number}")]
    HeightGap {
        /// Index in the journal.
        position: u64,
        /// Stored number.
        number: u64,
    },
}

/// The hash-chained block list.
#[derive(Debug, Clone)]
pub struct Journal {
    blocks: Vec<LedgerBlock>,
}

impl Journal {
    /// Start a journal with a genesis block committing to `chain_id`.
    #[must_use]
    pub fn new(chain_id: u64, genesis_timestamp: Timestamp) -> Self {
        let mut genesis = LedgerBlock {
            number: 0,
            parent_hash: ZERO_HASH,
            timestamp: genesis_timestamp,
            tx_hash: ZERO_HASH,
            from: Address::ZERO,
            nonce: chain_id,
            success: true,
            logs_hash: compute_logs_hash(&[]),
            hash: ZERO_HASH,
        };
        genesis.hash = genesis.compute_hash();
        Self {
            blocks: vec![genesis],
        }
    }

    /// Append a block carrying one applied transaction.
    pub fn append(
        &mut self,
        tx_hash: Hash,
        from: Address,
        nonce: u64,
        timestamp: Timestamp,
        status: &ReceiptStatus,
        logs: &[TodoEvent],
    ) -> &LedgerBlock {
        let head = self.head();
        let mut block = LedgerBlock {
            number: head.number + 1,
            parent_hash: head.hash,
            timestamp,
            tx_hash,
            from,
            nonce,
            success: matches!(status, ReceiptStatus::Success),
            logs_hash: compute_logs_hash(logs),
            hash: ZERO_HASH,
        };
        block.hash = block.compute_hash();
        self.blocks.push(block);
        self.head()
    }

    /// The latest block.
    #[must_use]
    pub fn head(&self) -> &LedgerBlock {
        // Genesis is pushed in `new` and blocks are never removed.
        &self.blocks[self.blocks.len() - 1]
    }

    /// Block at `number`, if present.
    #[must_use]
    pub fn block(&self, number: u64) -> Option<&LedgerBlock> {
        usize::try_from(number).ok().and_then(|i| self.blocks.get(i))
    }

    /// Number of blocks including genesis.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false; genesis exists from construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Recompute the chain and report the first inconsistency.
    pub fn verify(&self) -> Result<(), JournalError> {
        let mut parent = ZERO_HASH;
        for (position, block) in self.blocks.iter().enumerate() {
            let position = position as u64;
            if block.number != position {
                return Err(JournalError::HeightGap {
                    position,
                    number: block.number,
                });
            }
            if block.parent_hash != parent {
                return Err(JournalError::BrokenLink {
                    number: block.number,
                });
            }
            if block.compute_hash() != block.hash {
                return Err(JournalError::HashMismatch {
                    number: block.number,
                });
            }
            parent = block.hash;
        }
        Ok(())
    }
}
