//! # Shared Bus - Record Notification Bus
//!
//! Carries `TodoEvent` notifications from the record store to every client
//! that subscribed.
//!
//! ```text
//! ┌──────────────┐                    ┌────────────────┐
//! │ Record Store │                    │ Change Listener│
//! │              │    publish()       │                │
//! │              │ ──────┐            │                │
//! └──────────────┘       │            └────────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe(filter)
//! ```
//!
//! ## Delivery Rules
//!
//! - A subscription only sees events published after it was created; there is
//!   no historical replay.
//! - Events reach every subscriber in publish order.
//! - A subscriber that falls more than the channel capacity behind is told how
//!   many events it skipped (`SubscriptionError::Lagged`).

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventKind, TodoEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before it lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
