//! # User Notifications
//!
//! Short-lived messages ("toasts") raised by the cart, checkout, reservations and
//! admin operations, fanned out to every interested surface over a
//! [`tokio::sync::broadcast`] channel.
//!
//! The same stream doubles as the cart's change feed: a surface showing the cart
//! badge subscribes and re-reads the [`CartStore`](crate::cart::CartStore) totals
//! whenever a cart notification arrives.

use tokio::sync::broadcast;
use tracing::trace;

/// Default number of undelivered notifications kept per subscriber.
pub const DEFAULT_CAPACITY: usize = 64;

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    ItemAdded { id: String, name: String },
    QuantityUpdated { id: String, quantity: u32 },
    ItemRemoved { id: String },
    CartCleared,
    SignInRequired,
    OrderPlaced { order_id: String },
    OrderFailed,
    ReservationSubmitted { reservation_id: String },
    ReservationFailed,
    StatusUpdated { resource: &'static str, id: String, status: String },
}

impl Notification {
    pub fn level(&self) -> Level {
        match self {
            Notification::SignInRequired
            | Notification::OrderFailed
            | Notification::ReservationFailed => Level::Error,
            _ => Level::Success,
        }
    }

    /// The text shown to the visitor.
    pub fn message(&self) -> String {
        match self {
            Notification::ItemAdded { .. } => "Item added to cart".to_string(),
            Notification::QuantityUpdated { .. } => "Item quantity updated".to_string(),
            Notification::ItemRemoved { .. } => "Item removed from cart".to_string(),
            Notification::CartCleared => "Cart cleared".to_string(),
            Notification::SignInRequired => "Please sign in to continue".to_string(),
            Notification::OrderPlaced { .. } => "Order placed successfully!".to_string(),
            Notification::OrderFailed => "Failed to process order. Please try again.".to_string(),
            Notification::ReservationSubmitted { .. } => {
                "Reservation request submitted successfully!".to_string()
            }
            Notification::ReservationFailed => {
                "Failed to submit reservation. Please try again.".to_string()
            }
            Notification::StatusUpdated { resource, .. } => format!("{resource} status updated"),
        }
    }

    /// True for notifications that describe a change to the cart contents.
    pub fn is_cart_change(&self) -> bool {
        matches!(
            self,
            Notification::ItemAdded { .. }
                | Notification::QuantityUpdated { .. }
                | Notification::ItemRemoved { .. }
                | Notification::CartCleared
        )
    }
}

/// Cloneable sending half of the notification stream.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Notification>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Publishes a notification. Having no subscriber is not an error.
    pub fn notify(&self, notification: Notification) {
        trace!(?notification, "Notify");
        let _ = self.sender.send(notification);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Drains everything currently queued on a receiver. Test helper for the
/// "exactly once" style assertions.
pub fn drain(receiver: &mut broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut seen = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(notification) => seen.push(notification),
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_subscriber_sees_each_notification() {
        let notifier = Notifier::default();
        let mut first = notifier.subscribe();
        let mut second = notifier.subscribe();

        notifier.notify(Notification::CartCleared);

        assert_eq!(drain(&mut first), vec![Notification::CartCleared]);
        assert_eq!(drain(&mut second), vec![Notification::CartCleared]);
    }

    #[test]
    fn test_notify_without_subscribers_is_silent() {
        Notifier::new(1).notify(Notification::OrderFailed);
    }

    #[test]
    fn test_levels_and_messages() {
        assert_eq!(Notification::OrderFailed.level(), Level::Error);
        assert_eq!(
            Notification::OrderFailed.message(),
            "Failed to process order. Please try again."
        );
        let updated = Notification::StatusUpdated {
            resource: "Order",
            id: "order_1".into(),
            status: "ready".into(),
        };
        assert_eq!(updated.level(), Level::Success);
        assert_eq!(updated.message(), "Order status updated");
        assert!(!updated.is_cart_change());
    }
}
