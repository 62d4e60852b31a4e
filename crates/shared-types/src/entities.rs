//! # Core Domain Entities
//!
//! Identity, record identifiers and the task record itself.
//!
//! ## Clusters
//!
//! - **Identity**: `Address`
//! - **Records**: `TodoId`, `Todo`
//! - **Chain**: `Hash`, `Timestamp`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 32-byte Keccak-256 hash (transaction and block hashes).
pub type Hash = [u8; 32];

/// Unix timestamp in seconds, taken from the block that applied a mutation.
pub type Timestamp = u64;

// =============================================================================
// IDENTITY
// =============================================================================

/// A 20-byte ledger account address.
///
/// The address that signs a transaction is the caller for every store
/// operation; it is never taken from a call payload.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (0x0000...0000).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Creates an address with every byte set to `byte`. Handy for fixtures.
    #[must_use]
    pub const fn repeat(byte: u8) -> Self {
        Self([byte; 20])
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Full lowercase hex form with `0x` prefix.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "...")?;
        for byte in &self.0[18..] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

/// Error parsing an address from hex.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressParseError {
    /// Not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded to the wrong number of bytes.
    #[error("invalid address length: expected 20 bytes, got {0}")]
    InvalidLength(usize),
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes =
            hex::decode(digits).map_err(|e| AddressParseError::InvalidHex(e.to_string()))?;
        let array: [u8; 20] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressParseError::InvalidLength(bytes.len()))?;
        Ok(Self(array))
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// Identifier of a task record.
///
/// Assigned by the store in strictly increasing order starting at 1 and never
/// reused, so ascending id order is creation order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct TodoId(pub u64);

impl TodoId {
    /// The first id the store hands out.
    pub const FIRST: Self = Self(1);

    /// Returns the raw value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// The id following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for TodoId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A single task record as held by the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique, never reused.
    pub id: TodoId,
    /// Creator; the only identity allowed to mutate or delete the record.
    pub owner: Address,
    /// Non-empty text payload.
    pub content: String,
    /// Completion flag, false at creation.
    pub is_completed: bool,
    /// Set once at creation.
    pub created_at: Timestamp,
    /// Bumped by every mutation.
    pub updated_at: Timestamp,
}

impl Todo {
    /// Returns true if `caller` owns this record.
    #[must_use]
    pub fn is_owned_by(&self, caller: &Address) -> bool {
        self.owner == *caller
    }
}
