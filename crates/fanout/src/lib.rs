//! Event fan-out for order state changes.
//!
//! Delivery is push-plus-poll: the [`EventHub`] pushes events to live
//! subscribers with low latency, while every subscriber also performs a
//! periodic reconciliation pull against the repository. The push channel
//! is a latency optimization; the pull is the correctness backstop, so
//! events published to a channel with no live subscriber are simply
//! dropped rather than queued.

pub mod badge;
pub mod event;
pub mod hub;
pub mod subscription;

pub use badge::NotificationBadge;
pub use event::{OrderEvent, OrderEventKind};
pub use hub::{EventHub, Recipient};
pub use subscription::{DEFAULT_RECONCILE_INTERVAL, FeedMessage, Subscription};
