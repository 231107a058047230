//! Client-side unread-notification counter.

use crate::event::{OrderEvent, OrderEventKind};

/// Unread-notification badge maintained as a two-phase projection.
///
/// The count moves optimistically as events are observed and as the user
/// taps "mark all read", but none of that is treated as durable: the next
/// reconciliation pull calls [`reconcile`](Self::reconcile) with the
/// server's authoritative count, which always wins.
#[derive(Debug, Clone, Default)]
pub struct NotificationBadge {
    unread: u64,
}

impl NotificationBadge {
    /// Creates an empty badge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current (possibly optimistic) unread count.
    pub fn unread(&self) -> u64 {
        self.unread
    }

    /// Observes a feed event, counting notifications.
    pub fn observe(&mut self, event: &OrderEvent) {
        if event.kind == OrderEventKind::Notification {
            self.unread += 1;
        }
    }

    /// Optimistically zeroes the count before the server confirms.
    pub fn mark_all_read(&mut self) {
        self.unread = 0;
    }

    /// Overwrites the local count with the authoritative server value.
    pub fn reconcile(&mut self, server_unread: u64) {
        self.unread = server_unread;
    }
}
