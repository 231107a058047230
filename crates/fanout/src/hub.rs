//! Broadcast hub keyed by recipient.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use common::{UserId, VendorId};
use tokio::sync::broadcast;

use crate::event::{OrderEvent, OrderEventKind};
use crate::subscription::{DEFAULT_RECONCILE_INTERVAL, Subscription};

const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Audience for a fan-out channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recipient {
    /// The order's user (status updates and notifications).
    User(UserId),
    /// The order's vendor (queue management).
    Vendor(VendorId),
}

/// Push channel registry, one broadcast channel per recipient.
///
/// `order_created` and `order_updated` events go to both the order's
/// vendor and user; `notification` events go to the user only. Sending
/// to a recipient with no live subscriber drops the event — subscribers
/// recover missed updates through their reconciliation pull.
#[derive(Clone)]
pub struct EventHub {
    channels: Arc<RwLock<HashMap<Recipient, broadcast::Sender<OrderEvent>>>>,
    capacity: usize,
}

impl EventHub {
    /// Creates a hub with the default per-channel buffer.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a hub with a custom per-channel buffer capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Subscribes to a recipient's channel with the default reconciliation interval.
    pub fn subscribe(&self, recipient: Recipient) -> Subscription {
        self.subscribe_with(recipient, DEFAULT_RECONCILE_INTERVAL)
    }

    /// Subscribes with a custom reconciliation interval.
    pub fn subscribe_with(&self, recipient: Recipient, reconcile_interval: Duration) -> Subscription {
        Subscription::new(self.clone(), recipient, reconcile_interval)
    }

    /// Attaches a raw receiver, creating the channel on first use.
    pub(crate) fn receiver(&self, recipient: Recipient) -> broadcast::Receiver<OrderEvent> {
        let mut channels = self.channels.write().unwrap();
        channels
            .entry(recipient)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Publishes an event to its interested audiences.
    ///
    /// Never fails: a delivery problem only means nobody was listening,
    /// and the periodic pull covers that gap.
    pub fn publish(&self, event: OrderEvent) {
        match event.kind {
            OrderEventKind::Notification => {
                self.send_to(Recipient::User(event.user_id), event);
            }
            _ => {
                self.send_to(Recipient::Vendor(event.vendor_id), event.clone());
                self.send_to(Recipient::User(event.user_id), event);
            }
        }
    }

    /// Returns the number of live subscribers for a recipient.
    pub fn subscriber_count(&self, recipient: Recipient) -> usize {
        self.channels
            .read()
            .unwrap()
            .get(&recipient)
            .map(broadcast::Sender::receiver_count)
            .unwrap_or(0)
    }

    fn send_to(&self, recipient: Recipient, event: OrderEvent) {
        let sender = self.channels.read().unwrap().get(&recipient).cloned();

        let Some(sender) = sender else {
            tracing::debug!(?recipient, "no channel for recipient; event dropped");
            metrics::counter!("fanout_events_dropped").increment(1);
            return;
        };

        if sender.send(event).is_err() {
            tracing::debug!(?recipient, "no live subscriber; event dropped");
            metrics::counter!("fanout_events_dropped").increment(1);

            // Reap the idle channel; a returning subscriber gets a fresh one.
            let mut channels = self.channels.write().unwrap();
            if let Some(current) = channels.get(&recipient)
                && current.receiver_count() == 0
            {
                channels.remove(&recipient);
            }
        } else {
            metrics::counter!("fanout_events_published").increment(1);
        }
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}
