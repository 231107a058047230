//! Client-side subscription combining push delivery with a reconciliation tick.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::event::OrderEvent;
use crate::hub::{EventHub, Recipient};

/// Default reconciliation interval for subscribers.
pub const DEFAULT_RECONCILE_INTERVAL: Duration = Duration::from_secs(5);

/// A message from a subscription feed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    /// A pushed event; the consumer should re-fetch the affected state.
    Update(OrderEvent),
    /// Time to pull the authoritative list from the repository.
    Reconcile,
}

/// A live subscription for one recipient.
///
/// Combines the hub's push channel with a periodic reconciliation tick.
/// `Reconcile` is yielded on the tick, immediately on subscribe, when the
/// receiver lagged behind the channel buffer, and after a transparent
/// resubscribe when the channel closed — in every case the consumer is
/// expected to re-fetch authoritative state rather than patch
/// incrementally, which is what makes out-of-order push delivery safe.
pub struct Subscription {
    hub: EventHub,
    recipient: Recipient,
    rx: broadcast::Receiver<OrderEvent>,
    reconcile: tokio::time::Interval,
}

impl Subscription {
    pub(crate) fn new(hub: EventHub, recipient: Recipient, reconcile_interval: Duration) -> Self {
        let rx = hub.receiver(recipient);
        let reconcile = tokio::time::interval(reconcile_interval);
        Self {
            hub,
            recipient,
            rx,
            reconcile,
        }
    }

    /// Returns the recipient this subscription belongs to.
    pub fn recipient(&self) -> Recipient {
        self.recipient
    }

    /// Waits for the next feed message.
    pub async fn next(&mut self) -> FeedMessage {
        tokio::select! {
            _ = self.reconcile.tick() => FeedMessage::Reconcile,
            result = self.rx.recv() => match result {
                Ok(event) => FeedMessage::Update(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "subscriber lagged; forcing reconcile");
                    FeedMessage::Reconcile
                }
                Err(RecvError::Closed) => {
                    self.rx = self.hub.receiver(self.recipient);
                    FeedMessage::Reconcile
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{MenuItemId, OrderId, UserId, VendorId};
    use domain::{MenuItem, Money, NewOrder, Order};
    use tokio::time::timeout;

    fn order_for(user_id: UserId) -> Order {
        let vendor_id = VendorId::new();
        let new = NewOrder::from_selection(
            user_id,
            vec![(
                MenuItem {
                    id: MenuItemId::new(),
                    vendor_id,
                    name: "Mee Goreng".to_string(),
                    price: Money::from_cents(550),
                    picture: None,
                    is_available: true,
                },
                1,
            )],
        )
        .unwrap();
        Order::create(OrderId::new(), 1, new)
    }

    #[tokio::test]
    async fn first_message_is_an_immediate_reconcile() {
        let hub = EventHub::new();
        let mut subscription =
            hub.subscribe_with(Recipient::User(UserId::new()), Duration::from_secs(60));
        assert!(matches!(subscription.next().await, FeedMessage::Reconcile));
    }

    #[tokio::test]
    async fn reconcile_fires_periodically() {
        let hub = EventHub::new();
        let mut subscription =
            hub.subscribe_with(Recipient::User(UserId::new()), Duration::from_millis(20));

        // Initial tick plus at least two periodic ones.
        for _ in 0..3 {
            let message = timeout(Duration::from_secs(1), subscription.next())
                .await
                .unwrap();
            assert!(matches!(message, FeedMessage::Reconcile));
        }
    }

    #[tokio::test]
    async fn pushed_events_arrive_between_ticks() {
        let hub = EventHub::new();
        let user_id = UserId::new();
        let mut subscription =
            hub.subscribe_with(Recipient::User(user_id), Duration::from_secs(60));
        assert!(matches!(subscription.next().await, FeedMessage::Reconcile));

        let order = order_for(user_id);
        hub.publish(OrderEvent::created(&order));

        let message = timeout(Duration::from_secs(1), subscription.next())
            .await
            .unwrap();
        match message {
            FeedMessage::Update(event) => assert_eq!(event.order_id, order.id()),
            FeedMessage::Reconcile => panic!("expected pushed event"),
        }
    }

    #[tokio::test]
    async fn lag_forces_a_reconcile() {
        let hub = EventHub::with_capacity(2);
        let user_id = UserId::new();
        let mut subscription =
            hub.subscribe_with(Recipient::User(user_id), Duration::from_secs(60));
        assert!(matches!(subscription.next().await, FeedMessage::Reconcile));

        // Overflow the channel buffer while the subscriber is not reading.
        for _ in 0..4 {
            hub.publish(OrderEvent::created(&order_for(user_id)));
        }

        let message = timeout(Duration::from_secs(1), subscription.next())
            .await
            .unwrap();
        assert!(matches!(message, FeedMessage::Reconcile));

        // The retained tail is still delivered afterwards.
        let message = timeout(Duration::from_secs(1), subscription.next())
            .await
            .unwrap();
        assert!(matches!(message, FeedMessage::Update(_)));
    }
}
