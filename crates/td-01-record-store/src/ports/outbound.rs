//! # Driven Ports (SPI - Outbound)
//!
//! What the record store needs from its environment. Notification delivery
//! goes through `shared_bus::EventPublisher`; the only port defined here is
//! the time source for block timestamps.

use shared_types::Timestamp;

/// Source of block timestamps.
pub trait Clock: Send + Sync {
    /// Current time in unix seconds.
    fn now(&self) -> Timestamp;
}
